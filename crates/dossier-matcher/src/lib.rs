//! Dossier Candidate Matcher
//!
//! Deduplicates the merged stream of raw hits from all sources into unique
//! candidate identities. The stream may arrive in any interleaving (hit
//! order is only meaningful within one source), so the matcher commits
//! merge decisions in a canonical `(source, fetched_at, url)` order: any
//! permutation of the same hit set produces the same candidate set.
//!
//! Merging favors precision over recall. A false split is recoverable
//! downstream (the cross-validator links the pieces); a false merge
//! corrupts the record silently.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod matcher;

pub use config::MatcherConfig;
pub use error::MatchError;
pub use matcher::CandidateMatcher;
