//! Human-readable investigation summaries.

use crate::Result;
use colored::*;
use dossier_domain::hit::fields;
use dossier_domain::{Candidate, InvestigationRecord, InvestigationStatus};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Renders a record as a terminal-friendly report.
pub struct SummaryWriter {
    color_enabled: bool,
}

impl SummaryWriter {
    /// Create a summary writer.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Render the full report.
    pub fn render(&self, record: &InvestigationRecord) -> Result<String> {
        let mut out = String::new();

        out.push_str(&self.header(record));
        out.push('\n');

        if record.candidates.is_empty() {
            out.push_str(&self.colorize("No candidates found.", "yellow"));
            out.push('\n');
        } else {
            out.push_str(&self.candidates_table(record));
            out.push('\n');
        }

        if !record.links.is_empty() {
            out.push_str(&self.links_section(record));
            out.push('\n');
        }

        out.push_str(&self.footer(record));
        Ok(out)
    }

    /// Render the record as pretty JSON.
    pub fn render_json(&self, record: &InvestigationRecord) -> Result<String> {
        let candidates: Vec<serde_json::Value> = record
            .candidates
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id.to_string(),
                    "display_name": c.display_name(),
                    "match_score": c.match_score,
                    "low_confidence": c.low_confidence,
                    "sources": c.sources().iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                    "urls": c.hits.iter().map(|h| h.url.clone()).collect::<Vec<_>>(),
                    "fields": c.merged_fields.iter()
                        .map(|(k, f)| (k.clone(), f.value.clone()))
                        .collect::<std::collections::BTreeMap<_, _>>(),
                })
            })
            .collect();

        let links: Vec<serde_json::Value> = record
            .links
            .iter()
            .map(|l| {
                serde_json::json!({
                    "from": l.from.to_string(),
                    "to": l.to.to_string(),
                    "kind": l.kind.as_str(),
                    "evidence": l.evidence,
                    "strength": l.strength,
                })
            })
            .collect();

        let value = serde_json::json!({
            "target": record.target.name,
            "status": record.status.as_str(),
            "started_at": record.started_at,
            "completed_at": record.completed_at,
            "fault": record.fault,
            "source_errors": record.source_errors.iter()
                .map(|(s, k)| (s.to_string(), k.to_string()))
                .collect::<std::collections::BTreeMap<_, _>>(),
            "candidates": candidates,
            "links": links,
        });

        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn header(&self, record: &InvestigationRecord) -> String {
        let status = match record.status {
            InvestigationStatus::Complete => self.colorize("COMPLETE", "green"),
            InvestigationStatus::Partial => self.colorize("PARTIAL", "yellow"),
        };

        let mut out = format!(
            "{} {}\nStatus: {} ({} ms)\n",
            self.colorize("Investigation:", "cyan"),
            record.target.name,
            status,
            record.completed_at.saturating_sub(record.started_at),
        );

        if let Some(fault) = &record.fault {
            out.push_str(&self.colorize(&format!("Fault: {}", fault), "red"));
            out.push('\n');
        }

        for (source, kind) in &record.source_errors {
            out.push_str(&self.colorize(
                &format!("Source {}: {}", source, kind),
                "yellow",
            ));
            out.push('\n');
        }

        out
    }

    fn candidates_table(&self, record: &InvestigationRecord) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Name", "Score", "Sources", "Organization", "Location", "Flags"]);

        for candidate in &record.candidates {
            let sources = candidate
                .sources()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let flags = if candidate.low_confidence {
                "low confidence".to_string()
            } else {
                String::new()
            };

            builder.push_record([
                candidate.display_name().to_string(),
                format!("{:.2}", candidate.match_score),
                sources,
                merged_or_dash(candidate, fields::ORGANIZATION),
                merged_or_dash(candidate, fields::LOCATION),
                flags,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn links_section(&self, record: &InvestigationRecord) -> String {
        let mut out = self.colorize("Cross-validation:", "cyan");
        out.push('\n');

        for link in &record.links {
            let kind = match link.kind.as_str() {
                "confirms" => self.colorize("confirms", "green"),
                "contradicts" => self.colorize("contradicts", "red"),
                other => other.to_string(),
            };
            out.push_str(&format!(
                "  {} -> {} [{} {:.2}]: {}\n",
                name_of(record, link.from),
                name_of(record, link.to),
                kind,
                link.strength,
                link.evidence,
            ));
        }

        out
    }

    fn footer(&self, record: &InvestigationRecord) -> String {
        let contributing = record
            .candidates
            .iter()
            .flat_map(|c| c.sources())
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        let confidence = if record
            .candidates
            .first()
            .map(|c| c.match_score >= 0.8)
            .unwrap_or(false)
        {
            "High"
        } else {
            "Low"
        };

        format!(
            "{} candidate(s) from {} source(s). Overall confidence: {}.\nPublic sources only.\n",
            record.candidates.len(),
            contributing,
            confidence,
        )
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn merged_or_dash(candidate: &Candidate, key: &str) -> String {
    candidate
        .merged_fields
        .get(key)
        .map(|f| f.value.clone())
        .unwrap_or_else(|| "-".to_string())
}

fn name_of(record: &InvestigationRecord, id: dossier_domain::CandidateId) -> String {
    record
        .candidates
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.display_name().to_string())
        .unwrap_or_else(|| id.to_string())
}
