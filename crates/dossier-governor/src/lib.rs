//! Dossier Rate Governor
//!
//! Per-source admission control. One governor instance exists per external
//! source and is shared by every concurrent caller to that source. It owns
//! the source's [`RateState`] exclusively: a token bucket with periodic
//! refill, exponential backoff with jitter after rate-limit responses, and
//! a terminal "blocked" latch for sources that present CAPTCHAs.
//!
//! The transition rules live in [`state`] as pure functions over explicit
//! timestamps, so backoff behavior is testable without a clock or network.
//! The async waiting surface lives in [`governor`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod governor;
pub mod state;

pub use config::GovernorConfig;
pub use error::GovernorError;
pub use governor::{Outcome, RateGovernor};
pub use state::RateState;
