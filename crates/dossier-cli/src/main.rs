//! Dossier CLI - cross-source OSINT investigations from the terminal.

use clap::Parser;
use dossier_cli::cli::{Cli, CliFormat, Command, ConfigAction};
use dossier_cli::commands;
use dossier_cli::output::Messages;
use dossier_cli::repl;
use dossier_cli::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Log to stderr so reports on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load or create config
    let mut config = Config::load().unwrap_or_else(|_| {
        let cfg = Config::default();
        cfg.save().ok();
        cfg
    });

    let color = !cli.no_color && config.settings.color;
    let format = cli.format.unwrap_or(CliFormat::Text);
    let messages = Messages::new(color);

    match cli.command {
        None | Some(Command::Repl) => {
            repl::run_repl(&config, &messages, format).await?;
        }
        Some(Command::Investigate(args)) => {
            let engine = commands::build_engine(&config)?;
            commands::execute_investigate(
                &args.joined_name(),
                &engine,
                format,
                &messages,
                color,
                args.output.as_deref(),
            )
            .await?;
        }
        Some(Command::Config(args)) => match args.action {
            ConfigAction::Show => commands::execute_config_show(&config, &messages)?,
            ConfigAction::SetToken { token } => {
                commands::execute_config_set_token(token, &mut config, &messages)?
            }
        },
    }

    Ok(())
}
