//! Command execution: engine wiring and the individual CLI commands.

use crate::cli::CliFormat;
use crate::config::{masked_token, Config};
use crate::error::{CliError, Result};
use crate::output::Messages;
use dossier_domain::InvestigationRecord;
use dossier_engine::InvestigationEngine;
use dossier_report::{CsvExporter, SummaryWriter};
use dossier_sources::{
    CodeHostAdapter, ProfessionalNetworkAdapter, WebSearchAdapter,
};
use std::path::Path;
use std::sync::Arc;

/// Build an engine from configuration: one adapter plus governor per
/// enabled source, credentials resolved here and nowhere else.
pub fn build_engine(config: &Config) -> Result<InvestigationEngine> {
    let mut engine = InvestigationEngine::new(config.engine.clone())?;

    let code_host = &config.sources.code_host;
    if code_host.enabled {
        let adapter = CodeHostAdapter::new(&code_host.api_base, code_host.resolve_token());
        engine = engine.with_source(Arc::new(adapter), code_host.rate.clone());
    }

    let prof_net = &config.sources.professional_network;
    if prof_net.enabled {
        let adapter = ProfessionalNetworkAdapter::new(
            &prof_net.search_base,
            &prof_net.fallback_base,
            &prof_net.profile_marker,
            prof_net.max_results,
        );
        engine = engine.with_source(Arc::new(adapter), prof_net.rate.clone());
    }

    let web = &config.sources.web_search;
    if web.enabled {
        let adapter = WebSearchAdapter::new(&web.search_base, web.max_results);
        engine = engine.with_source(Arc::new(adapter), web.rate.clone());
    }

    if engine.source_ids().is_empty() {
        return Err(CliError::Config(
            "all sources are disabled; enable at least one".into(),
        ));
    }
    Ok(engine)
}

/// Render a record in the requested format.
pub fn render_record(
    record: &InvestigationRecord,
    format: CliFormat,
    color: bool,
) -> Result<String> {
    let rendered = match format {
        CliFormat::Text => SummaryWriter::new(color).render(record)?,
        CliFormat::Json => SummaryWriter::new(false).render_json(record)?,
        CliFormat::Csv => CsvExporter::new().export(record),
    };
    Ok(rendered)
}

/// Run one investigation and print (or write) its report.
pub async fn execute_investigate(
    name: &str,
    engine: &InvestigationEngine,
    format: CliFormat,
    messages: &Messages,
    color: bool,
    output: Option<&Path>,
) -> Result<()> {
    println!("{}", messages.info(&format!("Investigating {}...", name)));

    let record = engine.start_investigation(name).await?;
    let rendered = render_record(&record, format, color)?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            println!(
                "{}",
                messages.success(&format!("Report written to {}", path.display()))
            );
        }
        None => println!("{}", rendered),
    }

    if !record.source_errors.is_empty() {
        println!(
            "{}",
            messages.warning(&format!(
                "{} source(s) did not contribute; see report for details",
                record.source_errors.len()
            ))
        );
    }
    Ok(())
}

/// Show configuration paths and credential status.
pub fn execute_config_show(config: &Config, messages: &Messages) -> Result<()> {
    let path = Config::path()?;
    println!("Config file: {}", path.display());

    match config.sources.code_host.resolve_token() {
        Some(token) => println!(
            "{}",
            messages.success(&format!("Code-host token configured ({})", masked_token(&token)))
        ),
        None => println!(
            "{}",
            messages.warning(
                "No code-host token; public rate limits apply. Set one with 'dossier config set-token'."
            )
        ),
    }

    for (name, enabled, capacity) in [
        (
            "code_host",
            config.sources.code_host.enabled,
            config.sources.code_host.rate.capacity,
        ),
        (
            "professional_network",
            config.sources.professional_network.enabled,
            config.sources.professional_network.rate.capacity,
        ),
        (
            "web_search",
            config.sources.web_search.enabled,
            config.sources.web_search.rate.capacity,
        ),
    ] {
        let state = if enabled { "enabled" } else { "disabled" };
        println!("Source {}: {} ({} calls/interval)", name, state, capacity);
    }
    Ok(())
}

/// Store the code-host token in the config file.
pub fn execute_config_set_token(
    token: String,
    config: &mut Config,
    messages: &Messages,
) -> Result<()> {
    let token = token.trim().to_string();
    if token.len() < 20 {
        return Err(CliError::InvalidInput(
            "that does not look like a valid token (too short)".into(),
        ));
    }

    config.sources.code_host.token = Some(token);
    config.save()?;
    println!("{}", messages.success("Token saved"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_engine_registers_enabled_sources() {
        let config = Config::default();
        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.source_ids().len(), 3);
    }

    #[test]
    fn test_build_engine_skips_disabled_sources() {
        let mut config = Config::default();
        config.sources.web_search.enabled = false;
        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.source_ids().len(), 2);
    }

    #[test]
    fn test_build_engine_rejects_all_disabled() {
        let mut config = Config::default();
        config.sources.code_host.enabled = false;
        config.sources.professional_network.enabled = false;
        config.sources.web_search.enabled = false;
        assert!(matches!(build_engine(&config), Err(CliError::Config(_))));
    }

    #[test]
    fn test_short_token_rejected() {
        let mut config = Config::default();
        let messages = Messages::new(false);
        let result = execute_config_set_token("short".into(), &mut config, &messages);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
        assert!(config.sources.code_host.token.is_none());
    }
}
