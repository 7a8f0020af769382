//! Validation links - pairwise cross-source connections between candidates

use crate::candidate::CandidateId;

/// Kind of cross-source evidence connecting two candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Explicit cross-reference (one profile points at the other)
    Confirms,

    /// Explicitly conflicting identity anchors
    Contradicts,

    /// Overlapping but non-identical identifying fields
    Weak,
}

impl LinkKind {
    /// Stable string form for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Confirms => "confirms",
            LinkKind::Contradicts => "contradicts",
            LinkKind::Weak => "weak",
        }
    }
}

/// A pairwise validation link between two candidates.
///
/// Created by the cross-validator and read-only thereafter. Strength is
/// derived purely from the linked candidates' merged fields, so a fresh
/// validation pass recomputes every link rather than patching old ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationLink {
    /// Source candidate
    pub from: CandidateId,

    /// Target candidate
    pub to: CandidateId,

    /// Kind of evidence
    pub kind: LinkKind,

    /// Human-readable evidence summary (e.g. the cross-referenced URL)
    pub evidence: String,

    /// Strength of the evidence [0.0, 1.0]
    pub strength: f64,
}

impl ValidationLink {
    /// Create a new link.
    ///
    /// # Panics
    /// Panics if `strength` is outside [0, 1].
    pub fn new(
        from: CandidateId,
        to: CandidateId,
        kind: LinkKind,
        evidence: impl Into<String>,
        strength: f64,
    ) -> Self {
        assert!((0.0..=1.0).contains(&strength), "Strength must be in [0, 1]");

        Self {
            from,
            to,
            kind,
            evidence: evidence.into(),
            strength,
        }
    }

    /// Whether the link touches the given candidate.
    pub fn involves(&self, id: CandidateId) -> bool {
        self.from == id || self.to == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_involves_both_ends() {
        let a = CandidateId::from_value(1);
        let b = CandidateId::from_value(2);
        let c = CandidateId::from_value(3);
        let link = ValidationLink::new(a, b, LinkKind::Confirms, "https://x", 1.0);

        assert!(link.involves(a));
        assert!(link.involves(b));
        assert!(!link.involves(c));
    }

    #[test]
    #[should_panic]
    fn test_invalid_strength() {
        let a = CandidateId::from_value(1);
        let b = CandidateId::from_value(2);
        ValidationLink::new(a, b, LinkKind::Weak, "", 1.5);
    }
}
