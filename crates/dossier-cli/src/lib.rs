//! Dossier CLI library.
//!
//! The interactive front-end over the investigation engine: command-line
//! argument parsing, the conversational REPL with its free-text triggers,
//! configuration and credential management, and terminal output.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod intent;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
