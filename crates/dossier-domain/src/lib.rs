//! Dossier Domain Layer
//!
//! This crate contains the core data model for Dossier's cross-source
//! investigations. It has no infrastructure dependencies and defines the
//! value objects and deterministic scoring math that all other layers
//! depend upon.
//!
//! ## Key Concepts
//!
//! - **TargetQuery**: the person under investigation, with derived aliases
//! - **RawHit**: a single observation from one source, never mutated
//! - **Candidate**: a deduplicated identity built from one or more hits
//! - **ValidationLink**: a typed cross-source connection between candidates
//! - **InvestigationRecord**: the immutable artifact one investigation yields
//!
//! ## Architecture
//!
//! Network access, rate control, and orchestration live in other crates.
//! Everything here is pure: given the same hits, the similarity and scoring
//! functions produce the same answers, which is what makes investigations
//! reproducible.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod hit;
pub mod link;
pub mod record;
pub mod similarity;
pub mod target;

// Re-exports for convenience
pub use candidate::{Candidate, CandidateId, MergedField};
pub use hit::{RawHit, SourceId};
pub use link::{LinkKind, ValidationLink};
pub use record::{InvestigationRecord, InvestigationStatus, SourceErrorKind};
pub use target::TargetQuery;
