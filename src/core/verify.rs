/*!
 * Credential verification state machine
 *
 * One (SSID, password) attempt:
 *
 * ```text
 * Start -> ProfileInstalled -> Disconnected -> ConnectRequested -> StatusCheck
 *       -> {Success | Failure | Error} -> CleanedUp
 * ```
 *
 * Cleanup is tied to scope: the host profile and the staged payload are
 * released by guards on every exit path, including install failures.
 * The verifier never retries.
 */

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::core::status::{self, LocaleMarkers, StatusVerdict, DEFAULT_MARKERS};
use crate::platform::NetworkControl;
use crate::profile::{NetworkProfile, StagedProfile};

/// Fixed waits after state-changing adapter calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleIntervals {
    /// After forcing a disconnect
    pub disconnect: Duration,
    /// After a connect request, before reading status
    pub connect: Duration,
    /// Before reconnecting to the original network
    pub restore: Duration,
}

impl Default for SettleIntervals {
    fn default() -> Self {
        Self {
            disconnect: Duration::from_secs(3),
            connect: Duration::from_secs(3),
            restore: Duration::from_secs(2),
        }
    }
}

impl SettleIntervals {
    /// No waiting at all
    pub fn none() -> Self {
        Self {
            disconnect: Duration::ZERO,
            connect: Duration::ZERO,
            restore: Duration::ZERO,
        }
    }
}

/// States of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyState {
    Start,
    ProfileInstalled,
    Disconnected,
    ConnectRequested,
    StatusCheck,
    Success,
    Failure,
    Error,
    CleanedUp,
}

/// Classification of one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The adapter associated with the target network
    Success,
    /// The host rejected the key or never associated
    Failure,
    /// The attempt could not be carried out (profile staging or install)
    Error(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }

    fn terminal_state(&self) -> VerifyState {
        match self {
            AttemptOutcome::Success => VerifyState::Success,
            AttemptOutcome::Failure => VerifyState::Failure,
            AttemptOutcome::Error(_) => VerifyState::Error,
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success => write!(f, "success"),
            AttemptOutcome::Failure => write!(f, "failed"),
            AttemptOutcome::Error(reason) => write!(f, "error: {}", reason),
        }
    }
}

/// Removes the host profile when dropped
///
/// Created before the install is attempted, so removal is issued exactly
/// once per attempt whatever the outcome.
struct ProfileGuard<'a, C: NetworkControl + ?Sized> {
    control: &'a C,
    name: &'a str,
}

impl<C: NetworkControl + ?Sized> Drop for ProfileGuard<'_, C> {
    fn drop(&mut self) {
        match self.control.remove_profile(self.name) {
            Ok(()) => tracing::debug!(profile = self.name, state = ?VerifyState::CleanedUp, "profile removed"),
            Err(e) => tracing::warn!(profile = self.name, error = %e, "failed to remove profile"),
        }
    }
}

/// Drives the adapter through one attempt per call
pub struct CredentialVerifier<'a, C: NetworkControl + ?Sized> {
    control: &'a C,
    settle: SettleIntervals,
    markers: LocaleMarkers,
    staging_dir: PathBuf,
}

impl<'a, C: NetworkControl + ?Sized> CredentialVerifier<'a, C> {
    pub fn new(control: &'a C) -> Self {
        Self {
            control,
            settle: SettleIntervals::default(),
            markers: DEFAULT_MARKERS,
            staging_dir: std::env::temp_dir(),
        }
    }

    pub fn with_settle(mut self, settle: SettleIntervals) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_markers(mut self, markers: LocaleMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Test one candidate against `ssid`
    pub fn verify(&self, ssid: &str, password: &str) -> AttemptOutcome {
        trace_state(ssid, VerifyState::Start);

        let _installed = ProfileGuard {
            control: self.control,
            name: ssid,
        };
        let outcome = self.install_and_connect(ssid, password);
        trace_state(ssid, outcome.terminal_state());
        outcome
    }

    fn install_and_connect(&self, ssid: &str, password: &str) -> AttemptOutcome {
        let profile = NetworkProfile::wpa2_personal(ssid, password);
        let staged = match StagedProfile::write(profile, &self.staging_dir) {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!(ssid, error = %e, "could not stage profile");
                return AttemptOutcome::Error(e.to_string());
            }
        };

        if let Err(e) = self.control.install_profile(&staged) {
            tracing::warn!(ssid, error = %e, "profile install rejected");
            return AttemptOutcome::Error(e.to_string());
        }
        trace_state(ssid, VerifyState::ProfileInstalled);

        self.connect_and_check(ssid, staged.name())
    }

    fn connect_and_check(&self, ssid: &str, profile_name: &str) -> AttemptOutcome {
        if let Err(e) = self.control.disconnect() {
            tracing::debug!(error = %e, "disconnect failed, adapter probably idle");
        }
        settle(self.settle.disconnect);
        trace_state(ssid, VerifyState::Disconnected);

        let output = match self.control.connect(profile_name) {
            Ok(output) => output,
            Err(e) => {
                tracing::info!(ssid, error = %e, "connect command failed");
                return AttemptOutcome::Failure;
            }
        };
        trace_state(ssid, VerifyState::ConnectRequested);

        if !status::connect_accepted(&output, &self.markers) {
            tracing::debug!(ssid, output = output.trim(), "connect output has no success marker");
            return AttemptOutcome::Failure;
        }

        settle(self.settle.connect);
        trace_state(ssid, VerifyState::StatusCheck);

        let text = match self.control.query_interface_status() {
            Ok(text) => text,
            Err(e) => {
                tracing::info!(ssid, error = %e, "status query failed");
                return AttemptOutcome::Failure;
            }
        };

        match status::classify_status(&text, ssid, &self.markers) {
            StatusVerdict::Connected => AttemptOutcome::Success,
            StatusVerdict::SsidAbsent | StatusVerdict::Disconnected => AttemptOutcome::Failure,
            // Approximation: reachability only shows that some route out
            // exists, not that the target network accepted the key.
            StatusVerdict::Ambiguous => {
                tracing::debug!(ssid, "status ambiguous, falling back to reachability probe");
                if self.control.probe_connectivity() {
                    AttemptOutcome::Success
                } else {
                    AttemptOutcome::Failure
                }
            }
        }
    }
}

pub(crate) fn settle(interval: Duration) {
    if !interval.is_zero() {
        std::thread::sleep(interval);
    }
}

fn trace_state(ssid: &str, state: VerifyState) {
    tracing::trace!(ssid, ?state, "attempt state");
}
