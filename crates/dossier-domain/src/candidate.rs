//! Candidates - deduplicated identities built from raw hits

use crate::hit::{RawHit, SourceId};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a candidate based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability (creation order doubles as discovery order)
/// - 128-bit uniqueness
/// - RFC 9562-standard format with broad ecosystem support
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateId(u128);

impl CandidateId {
    /// Generate a new UUIDv7-based CandidateId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a CandidateId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a CandidateId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A merged field value together with the confidence of the hit that set it.
///
/// The confidence is what enforces the monotonic merge rule: a field set
/// from a higher-confidence hit is never overwritten by a lower-confidence
/// one.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedField {
    /// Field value
    pub value: String,
    /// Confidence of the hit that set the value
    pub confidence: f64,
}

/// A deduplicated identity believed to correspond to one real person.
///
/// Owned exclusively by the matcher while it is being assembled, then
/// handed (with links) to the validator and frozen into the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Unique identifier
    pub id: CandidateId,

    /// Hits merged into this candidate, in commit order
    pub hits: Vec<RawHit>,

    /// Monotonically-merged fields across all hits
    pub merged_fields: BTreeMap<String, MergedField>,

    /// Confidence this candidate is the target, in [0, 1]
    pub match_score: f64,

    /// Set by the validator when the candidate's only cross-source
    /// evidence is contradictory
    pub low_confidence: bool,
}

impl Candidate {
    /// Create a candidate from its first hit.
    pub fn from_hit(hit: RawHit) -> Self {
        let mut candidate = Self {
            id: CandidateId::new(),
            hits: Vec::new(),
            merged_fields: BTreeMap::new(),
            match_score: 0.0,
            low_confidence: false,
        };
        candidate.absorb(hit);
        candidate
    }

    /// Merge a hit into this candidate.
    ///
    /// Fields follow the monotonic-additive rule: a new value replaces an
    /// existing one only when it comes from a strictly higher-confidence
    /// hit. Ties keep the incumbent, which makes merging deterministic
    /// given a deterministic commit order.
    pub fn absorb(&mut self, hit: RawHit) {
        for (key, value) in &hit.fields {
            match self.merged_fields.get(key) {
                Some(existing) if existing.confidence >= hit.confidence => {}
                _ => {
                    self.merged_fields.insert(
                        key.clone(),
                        MergedField {
                            value: value.clone(),
                            confidence: hit.confidence,
                        },
                    );
                }
            }
        }
        self.hits.push(hit);
    }

    /// Whether this candidate already contains a hit with the given identity.
    pub fn contains_hit(&self, source: SourceId, url: &str) -> bool {
        self.hits.iter().any(|h| h.identity() == (source, url))
    }

    /// Display name from the highest-confidence hit.
    pub fn display_name(&self) -> &str {
        self.hits
            .iter()
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|h| h.display_name.as_str())
            .unwrap_or("")
    }

    /// Distinct sources contributing hits.
    pub fn sources(&self) -> Vec<SourceId> {
        let mut sources: Vec<SourceId> = self.hits.iter().map(|h| h.source).collect();
        sources.sort();
        sources.dedup();
        sources
    }

    /// Earliest fetch time across hits - the candidate's discovery time.
    pub fn discovered_at(&self) -> u64 {
        self.hits.iter().map(|h| h.fetched_at).min().unwrap_or(0)
    }

    /// All URLs this candidate is known by: hit URLs plus any merged
    /// website field. Used for explicit cross-reference detection.
    pub fn known_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.hits.iter().map(|h| h.url.as_str()).collect();
        if let Some(site) = self.merged_fields.get(crate::hit::fields::WEBSITE) {
            urls.push(site.value.as_str());
        }
        urls
    }
}
