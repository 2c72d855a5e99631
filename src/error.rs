//! Error types for instance loading and id resolution.

use std::fmt;
use std::io;

/// An id that does not exist in its category.
///
/// This is a contract violation rather than a recoverable condition, so it is
/// propagated all the way out of the solver instead of being defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    Garage(usize),
    Depot(usize),
    Station(usize),
    Truck(usize),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Garage(id) => write!(f, "unknown garage id {}", id),
            LookupError::Depot(id) => write!(f, "unknown depot id {}", id),
            LookupError::Station(id) => write!(f, "unknown station id {}", id),
            LookupError::Truck(id) => write!(f, "unknown truck id {}", id),
        }
    }
}

impl std::error::Error for LookupError {}

/// Failure while reading or writing an instance file.
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Json(serde_json::Error),
    /// Structurally malformed content. `line` is 1-based within the
    /// significant (non-comment) lines, or 0 when not line-oriented.
    Format { line: usize, message: String },
}

impl LoadError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        LoadError::Format {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "I/O error: {}", err),
            LoadError::Json(err) => write!(f, "invalid JSON instance: {}", err),
            LoadError::Format { line, message } if *line > 0 => {
                write!(f, "malformed instance at line {}: {}", line, message)
            }
            LoadError::Format { message, .. } => write!(f, "malformed instance: {}", message),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(err) => Some(err),
            LoadError::Json(err) => Some(err),
            LoadError::Format { .. } => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Json(err)
    }
}
