//! Flat tabular export.

use dossier_domain::hit::fields;
use dossier_domain::InvestigationRecord;

const COLUMNS: [&str; 9] = [
    "candidate_id",
    "match_score",
    "low_confidence",
    "source",
    "url",
    "display_name",
    "confidence",
    "organization",
    "website",
];

/// Renders a record as CSV: one row per source hit, candidate columns
/// repeated on each of its rows so the file stands alone.
pub struct CsvExporter;

impl CsvExporter {
    /// Create an exporter.
    pub fn new() -> Self {
        Self
    }

    /// Render the record as CSV text.
    pub fn export(&self, record: &InvestigationRecord) -> String {
        let mut out = COLUMNS.join(",");
        out.push('\n');

        for candidate in &record.candidates {
            for hit in &candidate.hits {
                let row = [
                    candidate.id.to_string(),
                    format!("{:.3}", candidate.match_score),
                    candidate.low_confidence.to_string(),
                    hit.source.to_string(),
                    hit.url.clone(),
                    hit.display_name.clone(),
                    format!("{:.3}", hit.confidence),
                    merged_value(candidate, fields::ORGANIZATION),
                    merged_value(candidate, fields::WEBSITE),
                ];
                out.push_str(
                    &row.iter()
                        .map(|cell| escape(cell))
                        .collect::<Vec<_>>()
                        .join(","),
                );
                out.push('\n');
            }
        }

        out
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn merged_value(candidate: &dossier_domain::Candidate, key: &str) -> String {
    candidate
        .merged_fields
        .get(key)
        .map(|f| f.value.clone())
        .unwrap_or_default()
}

/// Quote a cell when it contains a delimiter, quote, or newline; double
/// any embedded quotes.
fn escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
