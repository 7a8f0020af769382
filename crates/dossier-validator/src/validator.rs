//! Core cross-validation implementation

use crate::config::ValidatorConfig;
use crate::error::ValidateError;
use dossier_domain::hit::fields;
use dossier_domain::similarity::normalize_name;
use dossier_domain::{Candidate, CandidateId, LinkKind, ValidationLink};
use std::collections::HashSet;
use tracing::{debug, info};

/// Correlates candidates across sources into validation links and adjusts
/// match scores accordingly.
pub struct CrossValidator {
    config: ValidatorConfig,
}

impl CrossValidator {
    /// Create a validator.
    ///
    /// # Errors
    /// Returns `ValidateError::Config` when the configuration is invalid.
    pub fn new(config: ValidatorConfig) -> Result<Self, ValidateError> {
        config.validate().map_err(ValidateError::Config)?;
        Ok(Self { config })
    }

    /// Run one validation pass over a finished candidate set.
    ///
    /// Links are recomputed wholesale from the candidates' current merged
    /// fields - earlier passes' links must be discarded, never patched.
    /// On return the candidates are reordered for the record: descending
    /// match score, ties broken by earliest discovery.
    pub fn validate(
        &self,
        candidates: &mut [Candidate],
    ) -> Result<Vec<ValidationLink>, ValidateError> {
        for candidate in candidates.iter() {
            if !candidate.match_score.is_finite() {
                return Err(ValidateError::CorruptCandidate(format!(
                    "non-finite match score on {}",
                    candidate.id
                )));
            }
        }

        let mut links = Vec::new();
        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                let (a, b) = (&candidates[i], &candidates[j]);
                if !cross_source(a, b) {
                    continue;
                }
                if let Some(link) = self.link_between(a, b) {
                    debug!(
                        kind = link.kind.as_str(),
                        from = %link.from,
                        to = %link.to,
                        "validation link"
                    );
                    links.push(link);
                }
            }
        }

        self.apply_boosts(candidates, &links);
        flag_uncorroborated(candidates, &links);

        candidates.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.discovered_at().cmp(&b.discovered_at()))
                .then_with(|| a.id.cmp(&b.id))
        });

        info!(
            link_count = links.len(),
            candidate_count = candidates.len(),
            "cross-validation complete"
        );
        Ok(links)
    }

    /// Evidence between one cross-source pair, strongest kind wins.
    fn link_between(&self, a: &Candidate, b: &Candidate) -> Option<ValidationLink> {
        if let Some(url) = cross_reference(a, b) {
            return Some(ValidationLink::new(
                a.id,
                b.id,
                LinkKind::Confirms,
                format!("explicit cross-reference to {}", url),
                1.0,
            ));
        }

        if normalize_name(a.display_name()) != normalize_name(b.display_name()) {
            return None;
        }

        let org_a = merged_value(a, fields::ORGANIZATION);
        let org_b = merged_value(b, fields::ORGANIZATION);
        match (org_a, org_b) {
            (Some(x), Some(y)) if normalize_name(&x) == normalize_name(&y) => {
                Some(ValidationLink::new(
                    a.id,
                    b.id,
                    LinkKind::Weak,
                    format!("same name and organization '{}'", x),
                    self.config.weak_strength,
                ))
            }
            (Some(x), Some(y)) => Some(ValidationLink::new(
                a.id,
                b.id,
                LinkKind::Contradicts,
                format!("same name but conflicting organizations '{}' vs '{}'", x, y),
                self.config.contradiction_strength,
            )),
            _ => None,
        }
    }

    /// Boost every candidate once per distinct confirming partner, capped.
    fn apply_boosts(&self, candidates: &mut [Candidate], links: &[ValidationLink]) {
        for candidate in candidates.iter_mut() {
            let partners: HashSet<CandidateId> = links
                .iter()
                .filter(|l| l.kind == LinkKind::Confirms && l.involves(candidate.id))
                .map(|l| if l.from == candidate.id { l.to } else { l.from })
                .collect();

            if !partners.is_empty() {
                let boosted = candidate.match_score
                    + self.config.confirm_boost * partners.len() as f64;
                candidate.match_score = boosted.min(1.0);
            }
        }
    }
}

/// Whether the pair spans distinct sources at all.
fn cross_source(a: &Candidate, b: &Candidate) -> bool {
    let sources_a = a.sources();
    b.sources().iter().any(|s| !sources_a.contains(s))
}

/// An explicit cross-reference: any field value on one candidate containing
/// one of the other's profile URLs.
fn cross_reference(a: &Candidate, b: &Candidate) -> Option<String> {
    let points_at = |from: &Candidate, to: &Candidate| -> Option<String> {
        for field in from.merged_fields.values() {
            for hit in &to.hits {
                if field.value.contains(hit.url.as_str()) {
                    return Some(hit.url.clone());
                }
            }
        }
        None
    };

    points_at(a, b).or_else(|| points_at(b, a))
}

fn merged_value(candidate: &Candidate, key: &str) -> Option<String> {
    candidate.merged_fields.get(key).map(|f| f.value.clone())
}

/// Candidates whose only cross-source evidence is contradictory are
/// low-confidence - reported, never dropped.
fn flag_uncorroborated(candidates: &mut [Candidate], links: &[ValidationLink]) {
    for candidate in candidates.iter_mut() {
        let mine: Vec<&ValidationLink> =
            links.iter().filter(|l| l.involves(candidate.id)).collect();

        candidate.low_confidence = !mine.is_empty()
            && mine.iter().all(|l| l.kind == LinkKind::Contradicts);
    }
}
