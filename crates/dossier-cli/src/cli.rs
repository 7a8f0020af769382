//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dossier - cross-source OSINT investigations from the terminal.
#[derive(Debug, Parser)]
#[command(name = "dossier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable summary (default)
    Text,
    /// JSON report
    Json,
    /// Flat CSV export
    Csv,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one investigation and print its report
    Investigate(InvestigateArgs),

    /// Manage configuration and credentials
    Config(ConfigArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Arguments for the investigate command.
#[derive(Debug, Parser)]
pub struct InvestigateArgs {
    /// Target's name (quoting optional: extra words are joined)
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the configuration paths and credential status
    Show,

    /// Store the code-host API token
    SetToken {
        /// Personal access token (public read-only scope is enough)
        token: String,
    },
}

impl InvestigateArgs {
    /// The target name as one string.
    pub fn joined_name(&self) -> String {
        self.name.join(" ")
    }
}
