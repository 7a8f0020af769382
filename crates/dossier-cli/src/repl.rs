//! Interactive REPL (Read-Eval-Print Loop) mode.
//!
//! Free text drives investigations the way a conversation would; slash
//! commands cover the utilities. Type a name to investigate it.

use crate::cli::CliFormat;
use crate::commands;
use crate::config::Config;
use crate::error::Result;
use crate::intent::{self, Intent};
use crate::output::Messages;
use dossier_engine::InvestigationEngine;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const BANNER: &str = r#"
 ____   ___  ____ ____ ___ _____ ____
|  _ \ / _ \/ ___/ ___|_ _| ____|  _ \
| | | | | | \___ \___ \| ||  _| | |_) |
| |_| | |_| |___) |__) | || |___|  _ <
|____/ \___/|____/____/___|_____|_| \_\

        Cross-source investigations
"#;

/// Run the interactive REPL.
pub async fn run_repl(config: &Config, messages: &Messages, format: CliFormat) -> Result<()> {
    println!("{}", BANNER);
    println!(
        "{}",
        messages.info("Type a name to investigate it. '/help' lists commands, '/exit' quits.")
    );
    println!();

    let engine = commands::build_engine(config)?;

    let mut editor = DefaultEditor::new().map_err(|e| {
        std::io::Error::other(format!("Failed to initialize editor: {}", e))
    })?;
    let history_path = Config::history_path()?;
    let _ = editor.load_history(&history_path);

    let color = config.settings.color;
    let mut transcript: Vec<String> = Vec::new();

    loop {
        match editor.readline("dossier> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line).ok();
                transcript.push(line.to_string());

                if let Some(command) = line.strip_prefix('/') {
                    match command.split_whitespace().next().unwrap_or("") {
                        "exit" | "quit" | "q" => {
                            println!("{}", messages.info("Goodbye."));
                            break;
                        }
                        "help" | "?" => print_help(messages),
                        "history" => print_history(&transcript, messages),
                        "clear" => {
                            // ANSI clear + home
                            print!("\x1b[2J\x1b[H");
                            println!("{}", BANNER);
                        }
                        other => {
                            eprintln!(
                                "{}",
                                messages.error(&format!(
                                    "Unknown command '/{}'. Try '/help'.",
                                    other
                                ))
                            );
                        }
                    }
                    continue;
                }

                if let Err(e) = handle_free_text(line, &engine, messages, format, color).await {
                    eprintln!("{}", messages.error(&e.to_string()));
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", messages.info("Use '/exit' to quit"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", messages.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();
    Ok(())
}

async fn handle_free_text(
    line: &str,
    engine: &InvestigationEngine,
    messages: &Messages,
    format: CliFormat,
    color: bool,
) -> Result<()> {
    match intent::parse(line) {
        Intent::Investigate(name) => {
            commands::execute_investigate(&name, engine, format, messages, color, None).await
        }
        Intent::Report => {
            let record = engine.current_record()?;
            println!("{}", commands::render_record(&record, format, color)?);
            Ok(())
        }
        Intent::SmallTalk => {
            println!(
                "{}",
                messages.info(
                    "I research people across public sources. Tell me who to look up - \
                     'investigate Jane Doe' or just 'Jane Doe'."
                )
            );
            Ok(())
        }
        Intent::Unknown => {
            println!(
                "{}",
                messages.warning(
                    "Not sure what to do with that. Give me a full name, or try '/help'."
                )
            );
            Ok(())
        }
    }
}

fn print_help(messages: &Messages) {
    println!("{}", messages.info("Commands:"));
    println!("  /help            Show this help text");
    println!("  /history         Show this session's inputs");
    println!("  /clear           Clear the screen");
    println!("  /exit            Quit");
    println!();
    println!("Anything else is treated as conversation:");
    println!("  investigate <name>   Run an investigation");
    println!("  <First Last>         Same thing");
    println!("  make report          Re-show the last report");
}

fn print_history(transcript: &[String], messages: &Messages) {
    if transcript.is_empty() {
        println!("{}", messages.info("No history yet."));
        return;
    }
    for (index, line) in transcript.iter().enumerate() {
        println!("{:4}  {}", index + 1, line);
    }
}
