//! Dossier Investigation Engine
//!
//! The orchestrator that drives one investigation end to end: fan out one
//! task per source adapter (each gated by its rate governor and a shared
//! investigation-wide deadline), accumulate hits as they stream in, then
//! run the matcher and cross-validator as sequential aggregation phases
//! and freeze the result into an immutable [`InvestigationRecord`].
//!
//! Per-source failures never abort an investigation; they are recorded on
//! the record and the engine proceeds with whatever sources delivered.
//! Only an internal aggregation fault marks the run as failed, and even
//! then the candidates computed before the fault are preserved.
//!
//! [`InvestigationRecord`]: dossier_domain::InvestigationRecord

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod phase;

pub use config::EngineConfig;
pub use error::EngineError;
pub use orchestrator::InvestigationEngine;
pub use phase::Phase;
