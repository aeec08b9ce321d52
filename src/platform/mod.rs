/*!
 * Wireless control plane
 *
 * The brute-force core never shells out directly. It talks to the adapter
 * through [`NetworkControl`], which has a host implementation driving
 * `netsh wlan` and an in-memory mock for tests.
 */

pub mod mock;
pub mod netsh;

pub use mock::{MockCall, MockControl};
pub use netsh::NetshControl;

use crate::error::Result;
use crate::profile::StagedProfile;

/// Capabilities the verifier and orchestrator need from the wireless adapter
///
/// All calls are synchronous and text-in/text-out. Callers decide which
/// failures matter: removal and disconnect errors are only ever logged.
pub trait NetworkControl {
    /// Register a staged profile with the host
    fn install_profile(&self, staged: &StagedProfile) -> Result<()>;

    /// Delete a host profile by name
    fn remove_profile(&self, name: &str) -> Result<()>;

    /// Drop the current association, if any
    fn disconnect(&self) -> Result<()>;

    /// Request association with a registered profile
    ///
    /// Returns the raw host output. A clean exit does not mean the
    /// association succeeded; the text has to be checked for a success marker.
    fn connect(&self, profile_name: &str) -> Result<String>;

    /// Raw status text for the active wireless interface
    fn query_interface_status(&self) -> Result<String>;

    /// One bounded reachability probe against a well-known address
    fn probe_connectivity(&self) -> bool;
}
