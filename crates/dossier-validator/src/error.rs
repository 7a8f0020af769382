//! Error types for the Cross-Validator

use thiserror::Error;

/// Errors that can occur during cross-validation
#[derive(Error, Debug)]
pub enum ValidateError {
    /// A candidate carries values the link math cannot work with
    #[error("Corrupt candidate: {0}")]
    CorruptCandidate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
