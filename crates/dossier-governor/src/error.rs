//! Error types for the Rate Governor

use dossier_domain::SourceId;
use thiserror::Error;

/// Errors surfaced by governor acquisition
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernorError {
    /// The deadline elapsed before a call slot became available
    #[error("Deadline elapsed waiting for a {0} call slot")]
    DeadlineElapsed(SourceId),

    /// The source is blocked for the remainder of the investigation
    #[error("Source {0} is unavailable (blocked)")]
    SourceUnavailable(SourceId),
}
