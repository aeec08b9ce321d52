// Core library modules
pub mod bruteforce;
pub mod dictionary;
pub mod status;
pub mod verify;

// Re-exports
pub use bruteforce::{AttemptRecord, BruteForceResult, BruteForcer, BruteforceConfig, Termination};
pub use dictionary::{DictionarySpec, BUILTIN_PASSWORDS};
pub use status::{classify_status, connect_accepted, AdapterStatus, LocaleMarkers, StatusVerdict, DEFAULT_MARKERS};
pub use verify::{AttemptOutcome, CredentialVerifier, SettleIntervals, VerifyState};
