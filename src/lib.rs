// Public exports for the binary and integration tests
pub mod core;
pub mod error;
pub mod platform;
pub mod profile;
pub mod report;
pub mod wifi;

pub use crate::core::{
    AttemptOutcome, AttemptRecord, BruteForceResult, BruteForcer, BruteforceConfig,
    CredentialVerifier, DictionarySpec, SettleIntervals, Termination,
};
pub use error::{Error, Result};
pub use platform::{MockControl, NetshControl, NetworkControl};
pub use profile::{NetworkProfile, StagedProfile};
