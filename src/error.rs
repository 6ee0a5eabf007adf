//! Crate-level error types.

use std::fmt;

/// Errors produced by the orbicam crate.
#[derive(Debug)]
pub enum OrbicamError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Malformed gesture replay script.
    Replay(String),
    /// A DOM call failed or no window/document is available.
    Dom(String),
}

impl fmt::Display for OrbicamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Replay(msg) => write!(f, "replay error: {msg}"),
            Self::Dom(msg) => write!(f, "DOM error: {msg}"),
        }
    }
}

impl std::error::Error for OrbicamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for OrbicamError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
