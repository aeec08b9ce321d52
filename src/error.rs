/*!
 * Error types
 *
 * Only dictionary failures abort a run. Everything else is absorbed by the
 * state machine and turned into a per-candidate outcome.
 * Error messages never carry candidate passwords.
 */

use std::path::PathBuf;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Custom dictionary could not be opened or read
    #[error("failed to load dictionary {path}: {source}")]
    DictionaryLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Profile payload could not be written to the staging directory
    #[error("failed to stage profile payload at {path}: {source}")]
    ProfileStage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Host rejected the profile
    #[error("host rejected profile '{name}': {detail}")]
    ProfileInstall { name: String, detail: String },

    /// Host command could not be spawned
    #[error("failed to run {program}: {source}")]
    Command {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Host command ran but reported failure
    #[error("{program} exited with {status}: {output}")]
    CommandFailed {
        program: String,
        status: String,
        output: String,
    },

    /// Result report could not be written
    #[error("failed to write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
