//! Dossier Cross-Validator
//!
//! Correlates candidates across distinct sources once all adapters have
//! settled. An explicit cross-reference (one profile pointing at another)
//! confirms both sides at full strength; overlapping identity fields yield
//! weak corroboration; conflicting identity anchors yield a contradiction.
//!
//! Contradicted candidates are flagged, never discarded: the record
//! reports ambiguity rather than silently resolving it.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod validator;

pub use config::ValidatorConfig;
pub use error::ValidateError;
pub use validator::CrossValidator;
