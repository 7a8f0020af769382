//! Raw hits - single observations emitted by source adapters

use std::collections::BTreeMap;
use std::fmt;

/// Well-known extracted-field keys shared by adapters and the validator.
///
/// Adapters may emit any keys they like, but fields under these names take
/// part in cross-validation (organization matching, explicit URL
/// cross-references) and merge similarity.
pub mod fields {
    /// Account handle on the source (e.g. a code-hosting username).
    pub const HANDLE: &str = "handle";
    /// Stated employer or organization text.
    pub const ORGANIZATION: &str = "organization";
    /// Stated location text.
    pub const LOCATION: &str = "location";
    /// Personal website / portfolio URL.
    pub const WEBSITE: &str = "website";
    /// URL of another profile this one points at. References corroborate
    /// (the cross-validator turns them into links); they never merge.
    pub const REFERENCE: &str = "reference";
    /// Profile headline or bio text.
    pub const HEADLINE: &str = "headline";
}

/// Identifier for one external data source.
///
/// The set of sources is closed: adding a source means adding a variant
/// here and an adapter implementation, not touching the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceId {
    /// Professional-network profile discovery via search-engine footprints
    ProfessionalNetwork,

    /// Code-hosting platform JSON API
    CodeHost,

    /// General web search for portfolios, resumes, and personal sites
    WebSearch,
}

impl SourceId {
    /// All known sources, in canonical order.
    pub const ALL: [SourceId; 3] = [
        SourceId::ProfessionalNetwork,
        SourceId::CodeHost,
        SourceId::WebSearch,
    ];

    /// Stable string form used in logs, reports, and config sections.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::ProfessionalNetwork => "professional_network",
            SourceId::CodeHost => "code_host",
            SourceId::WebSearch => "web_search",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observation from one source.
///
/// Hits are immutable once created; enrichment (detail fetch) produces a
/// replacement hit rather than mutating the original.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    /// Source that produced this hit
    pub source: SourceId,

    /// Canonical profile/result URL
    pub url: String,

    /// Display name as the source presented it
    pub display_name: String,

    /// Extracted fields (see [`fields`] for the well-known keys)
    pub fields: BTreeMap<String, String>,

    /// When the hit was fetched (milliseconds since Unix epoch)
    pub fetched_at: u64,

    /// Source-local confidence that this hit is the target, in [0, 1]
    pub confidence: f64,
}

impl RawHit {
    /// Create a new hit.
    ///
    /// # Panics
    /// Panics if `confidence` is outside [0, 1].
    pub fn new(
        source: SourceId,
        url: impl Into<String>,
        display_name: impl Into<String>,
        fetched_at: u64,
        confidence: f64,
    ) -> Self {
        assert!(
            (0.0..=1.0).contains(&confidence),
            "Confidence must be in [0, 1]"
        );

        Self {
            source,
            url: url.into(),
            display_name: display_name.into(),
            fields: BTreeMap::new(),
            fetched_at,
            confidence,
        }
    }

    /// Attach an extracted field, builder-style.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The hit's dedup identity: no two candidates may share one.
    pub fn identity(&self) -> (SourceId, &str) {
        (self.source, self.url.as_str())
    }

    /// Deterministic commit-order key: hits are merged in this order no
    /// matter how concurrency interleaved their arrival.
    pub fn commit_key(&self) -> (SourceId, u64, &str) {
        (self.source, self.fetched_at, self.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_display() {
        assert_eq!(SourceId::CodeHost.to_string(), "code_host");
        assert_eq!(
            SourceId::ProfessionalNetwork.to_string(),
            "professional_network"
        );
    }

    #[test]
    fn test_hit_builder() {
        let hit = RawHit::new(SourceId::CodeHost, "https://example.com/u/jdoe", "Jane Doe", 1000, 0.8)
            .with_field(fields::HANDLE, "jdoe")
            .with_field(fields::ORGANIZATION, "Acme");

        assert_eq!(hit.fields.get(fields::HANDLE).unwrap(), "jdoe");
        assert_eq!(hit.identity(), (SourceId::CodeHost, "https://example.com/u/jdoe"));
    }

    #[test]
    #[should_panic]
    fn test_hit_invalid_confidence() {
        RawHit::new(SourceId::WebSearch, "https://example.com", "x", 0, 1.5);
    }

    #[test]
    fn test_commit_key_orders_within_source() {
        let a = RawHit::new(SourceId::CodeHost, "https://a", "a", 1, 0.5);
        let b = RawHit::new(SourceId::CodeHost, "https://b", "b", 2, 0.5);
        assert!(a.commit_key() < b.commit_key());
    }
}
