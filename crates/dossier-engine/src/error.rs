//! Error types for the Investigation Engine

use thiserror::Error;

/// Errors surfaced by the engine's command surface
#[derive(Error, Debug)]
pub enum EngineError {
    /// An investigation for this target is already running
    #[error("An investigation for '{0}' is already in progress")]
    AlreadyInProgress(String),

    /// No investigation has completed yet
    #[error("No active investigation. Investigate a target first.")]
    NoActiveInvestigation,

    /// A defect in merge or validation logic (not a network condition)
    #[error("Aggregation fault: {0}")]
    AggregationFault(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
