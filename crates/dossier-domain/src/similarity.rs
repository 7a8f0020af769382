//! Similarity and match scoring
//!
//! Implements the deterministic similarity formula used to decide whether a
//! raw hit merges into an existing candidate, and the corroboration-weighted
//! match score. Everything here is pure so the merge decision can be tested
//! without adapters or a network.

use crate::candidate::Candidate;
use crate::hit::{fields, RawHit};

/// Tunable constant: minimum similarity for a merge (default: 0.85)
pub const MERGE_THRESHOLD: f64 = 0.85;

/// Tunable constant: margin below which two merge choices are ambiguous
pub const TIE_MARGIN: f64 = 0.05;

/// Tunable constant: weight of fuzzy name distance in the blend
pub const NAME_WEIGHT: f64 = 0.7;

/// Tunable constant: weight of exact field overlap in the blend
pub const FIELD_WEIGHT: f64 = 0.3;

/// Tunable constant: per-extra-source bonus on the match score
pub const CORROBORATION_BONUS: f64 = 0.1;

/// Configuration for similarity and scoring
#[derive(Debug, Clone)]
pub struct SimilarityConfig {
    /// Minimum similarity for a merge
    pub merge_threshold: f64,
    /// Two candidates within this margin of each other are ambiguous;
    /// ambiguity resolves to "do not merge"
    pub tie_margin: f64,
    /// Weight of fuzzy name distance
    pub name_weight: f64,
    /// Weight of exact field overlap
    pub field_weight: f64,
    /// Per-extra-source bonus on the match score
    pub corroboration_bonus: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            merge_threshold: MERGE_THRESHOLD,
            tie_margin: TIE_MARGIN,
            name_weight: NAME_WEIGHT,
            field_weight: FIELD_WEIGHT,
            corroboration_bonus: CORROBORATION_BONUS,
        }
    }
}

/// Lowercase, strip punctuation, collapse whitespace.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = true;
    for c in raw.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Classic edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}

/// Fuzzy name similarity in [0, 1]: 1.0 for identical normalized names,
/// falling off with edit distance relative to the longer name.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_name(a);
    let b = normalize_name(b);

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }

    1.0 - (levenshtein(&a, &b) as f64 / longest as f64)
}

/// Fraction of shared field keys whose values agree exactly (after name
/// normalization). Returns 0.0 when the candidate and hit share no keys.
pub fn field_overlap(candidate: &Candidate, hit: &RawHit) -> f64 {
    let mut shared = 0usize;
    let mut agreeing = 0usize;

    for (key, value) in &hit.fields {
        if let Some(existing) = candidate.merged_fields.get(key) {
            shared += 1;
            if normalize_name(&existing.value) == normalize_name(value) {
                agreeing += 1;
            }
        }
    }

    if shared == 0 {
        0.0
    } else {
        agreeing as f64 / shared as f64
    }
}

/// Similarity between an existing candidate and a new hit.
///
/// Structural signals are decisive: a shared profile URL or an equal handle
/// means the same account, so similarity is 1.0 outright. Otherwise the
/// score blends fuzzy name distance with exact field overlap.
pub fn candidate_similarity(candidate: &Candidate, hit: &RawHit, config: &SimilarityConfig) -> f64 {
    // same account: shared URL (hit URL known to the candidate, or the
    // candidate's website points at the hit)
    if candidate.known_urls().iter().any(|u| *u == hit.url) {
        return 1.0;
    }
    if let Some(site) = hit.fields.get(fields::WEBSITE) {
        if candidate.known_urls().iter().any(|u| *u == site.as_str()) {
            return 1.0;
        }
    }

    // same handle
    if let (Some(a), Some(b)) = (
        candidate.merged_fields.get(fields::HANDLE),
        hit.fields.get(fields::HANDLE),
    ) {
        if normalize_name(&a.value) == normalize_name(b) {
            return 1.0;
        }
    }

    let name = name_similarity(candidate.display_name(), &hit.display_name);
    let overlap = field_overlap(candidate, hit);

    (config.name_weight * name + config.field_weight * overlap).clamp(0.0, 1.0)
}

/// Match score for a set of hits: the maximum hit confidence, weighted up
/// by how many distinct sources corroborate the identity. Capped at 1.0.
pub fn corroborated_score(hits: &[RawHit], bonus: f64) -> f64 {
    let max_confidence = hits.iter().map(|h| h.confidence).fold(0.0, f64::max);

    let mut sources: Vec<_> = hits.iter().map(|h| h.source).collect();
    sources.sort();
    sources.dedup();
    let extra_sources = sources.len().saturating_sub(1) as f64;

    (max_confidence * (1.0 + bonus * extra_sources)).min(1.0)
}
