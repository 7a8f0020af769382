//! Investigation records - the immutable artifact one investigation yields

use crate::candidate::Candidate;
use crate::hit::SourceId;
use crate::link::ValidationLink;
use crate::target::TargetQuery;
use std::collections::BTreeMap;
use std::fmt;

/// Classified failure of one source, as recorded on the investigation.
///
/// Adapters classify every failure into exactly one of these kinds; the
/// orchestrator records them per source and proceeds with whatever sources
/// succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceErrorKind {
    /// The source throttled us
    RateLimited,

    /// CAPTCHA or anti-bot interstitial detected; no retry this investigation
    Blocked,

    /// The source answered and had nothing for this target
    NotFound,

    /// Network failure or deadline expiry; partial hits may exist
    Transient,

    /// Malformed response or parsing break
    Fatal,
}

impl SourceErrorKind {
    /// Stable string form for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceErrorKind::RateLimited => "rate_limited",
            SourceErrorKind::Blocked => "blocked",
            SourceErrorKind::NotFound => "not_found",
            SourceErrorKind::Transient => "transient",
            SourceErrorKind::Fatal => "fatal",
        }
    }

    /// `NotFound` is an answer, not a data gap: a source that explicitly
    /// reported no results still counts toward a complete investigation.
    pub fn is_absence(&self) -> bool {
        matches!(self, SourceErrorKind::NotFound)
    }
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion status of an investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestigationStatus {
    /// At least one source failed to contribute data
    Partial,

    /// Every source succeeded or explicitly reported nothing to find
    Complete,
}

impl InvestigationStatus {
    /// Stable string form for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestigationStatus::Partial => "partial",
            InvestigationStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for InvestigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single immutable artifact produced per investigation.
///
/// Built by the orchestrator, handed by shared reference (read-only) to
/// report writers. Candidates are ordered by descending match score with
/// ties broken by earliest discovery time.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestigationRecord {
    /// The person investigated
    pub target: TargetQuery,

    /// Deduplicated, validated candidates, best first
    pub candidates: Vec<Candidate>,

    /// Cross-source validation links between candidates
    pub links: Vec<ValidationLink>,

    /// Per-source failures; sources absent from this map succeeded
    pub source_errors: BTreeMap<SourceId, SourceErrorKind>,

    /// Investigation start (milliseconds since Unix epoch)
    pub started_at: u64,

    /// Investigation completion (milliseconds since Unix epoch)
    pub completed_at: u64,

    /// Whether every source contributed
    pub status: InvestigationStatus,

    /// Set when aggregation itself failed; candidates computed before the
    /// fault are preserved above
    pub fault: Option<String>,
}

impl InvestigationRecord {
    /// Compute the status implied by the recorded source errors: complete
    /// iff every failing source merely reported an absence of results.
    pub fn status_from_errors(errors: &BTreeMap<SourceId, SourceErrorKind>) -> InvestigationStatus {
        if errors.values().all(|kind| kind.is_absence()) {
            InvestigationStatus::Complete
        } else {
            InvestigationStatus::Partial
        }
    }

    /// Links touching the given candidate.
    pub fn links_for(&self, id: crate::candidate::CandidateId) -> Vec<&ValidationLink> {
        self.links.iter().filter(|l| l.involves(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_complete_when_no_errors() {
        let errors = BTreeMap::new();
        assert_eq!(
            InvestigationRecord::status_from_errors(&errors),
            InvestigationStatus::Complete
        );
    }

    #[test]
    fn test_status_complete_when_only_not_found() {
        let mut errors = BTreeMap::new();
        errors.insert(SourceId::WebSearch, SourceErrorKind::NotFound);
        assert_eq!(
            InvestigationRecord::status_from_errors(&errors),
            InvestigationStatus::Complete
        );
    }

    #[test]
    fn test_status_partial_on_any_data_gap() {
        let mut errors = BTreeMap::new();
        errors.insert(SourceId::WebSearch, SourceErrorKind::NotFound);
        errors.insert(SourceId::CodeHost, SourceErrorKind::RateLimited);
        assert_eq!(
            InvestigationRecord::status_from_errors(&errors),
            InvestigationStatus::Partial
        );
    }
}
