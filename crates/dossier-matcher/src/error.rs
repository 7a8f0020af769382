//! Error types for the Candidate Matcher

use thiserror::Error;

/// Errors that can occur during candidate assembly
#[derive(Error, Debug)]
pub enum MatchError {
    /// A hit carries values the scoring math cannot work with
    #[error("Invalid hit: {0}")]
    InvalidHit(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
