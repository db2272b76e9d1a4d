//! @acp:module "Errors"
//! @acp:summary "Error taxonomy for the parity audit pipeline"
//! @acp:domain cli
//! @acp:layer utility

use std::path::PathBuf;

use thiserror::Error;

/// @acp:summary "Errors that abort an audit run"
#[derive(Debug, Error)]
pub enum AuditError {
    /// Malformed line in the override table
    #[error("{}:{line}: {message}", path.display())]
    Config {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A required input root or file does not exist
    #[error("{what} not found at {}", path.display())]
    InputNotFound { what: &'static str, path: PathBuf },

    /// The reference index does not have the expected shape
    #[error("malformed reference index: {0}")]
    MalformedIndex(String),

    /// An external toolchain invocation failed
    #[error("external command failed: {0}")]
    External(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AuditError {
    /// Shorthand for an override-table error at a given line
    pub fn config(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        AuditError::Config {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Shorthand for a missing input
    pub fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        AuditError::InputNotFound {
            what,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
