/*!
 * Candidate password source
 */

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Built-in list of common weak passphrases, tried in this order
pub const BUILTIN_PASSWORDS: &[&str] = &[
    "12345678",
    "00000000",
    "1q2w3e4r",
    "123456789",
    "1234567890",
    "11111111",
    "88888888",
    "66666666",
    "123123123",
    "1qaz2wsx",
];

/// Where candidates come from and how many of them to try
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionarySpec {
    /// Custom dictionary file; `None` selects the built-in list
    pub path: Option<PathBuf>,
    /// Maximum number of candidates, `0` for unlimited
    pub max_attempts: usize,
}

impl DictionarySpec {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            max_attempts: 0,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Load the ordered candidate list
    ///
    /// Order is preserved and duplicates are kept. With a cap, only the
    /// first `max_attempts` entries survive.
    pub fn load(&self) -> Result<Vec<String>> {
        let mut passwords = match &self.path {
            Some(path) => read_wordlist(path)?,
            None => BUILTIN_PASSWORDS.iter().map(|p| p.to_string()).collect(),
        };

        if self.max_attempts > 0 {
            passwords.truncate(self.max_attempts);
        }

        Ok(passwords)
    }
}

/// One candidate per line, surrounding whitespace trimmed, blank lines dropped
fn read_wordlist(path: &Path) -> Result<Vec<String>> {
    let load_error = |source| Error::DictionaryLoad {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(load_error)?;
    let mut passwords = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(load_error)?;
        let password = line.trim();
        if !password.is_empty() {
            passwords.push(password.to_string());
        }
    }

    Ok(passwords)
}
