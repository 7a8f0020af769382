//! Dossier Report Writers
//!
//! External consumers of a finished [`InvestigationRecord`]. Everything
//! here reads the record through a shared reference and renders from
//! `candidates` and `links` alone - the engine neither knows about nor
//! depends on these writers.
//!
//! [`InvestigationRecord`]: dossier_domain::InvestigationRecord

#![warn(missing_docs)]

pub mod export;
pub mod summary;

use thiserror::Error;

pub use export::CsvExporter;
pub use summary::SummaryWriter;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while rendering reports
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
