//! Core orchestrator implementation

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::phase::Phase;
use dossier_domain::{
    InvestigationRecord, InvestigationStatus, RawHit, SourceErrorKind, SourceId, TargetQuery,
};
use dossier_governor::{GovernorConfig, GovernorError, Outcome, RateGovernor};
use dossier_matcher::CandidateMatcher;
use dossier_sources::{SourceAdapter, SourceError};
use dossier_validator::CrossValidator;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

/// One registered source: its adapter plus the governor gating it.
struct SourceHandle {
    adapter: Arc<dyn SourceAdapter>,
    governor: Arc<RateGovernor>,
}

/// Long-lived engine owning the registered sources and the command surface.
///
/// Each call to [`start_investigation`](Self::start_investigation) runs one
/// single-use investigation to completion; a fresh one is created per run,
/// so no lifecycle state leaks between investigations. At most one
/// investigation per target may be in flight at a time - duplicates are
/// rejected, not queued.
pub struct InvestigationEngine {
    config: EngineConfig,
    sources: Vec<SourceHandle>,
    in_flight: Mutex<HashSet<String>>,
    last: RwLock<Option<Arc<InvestigationRecord>>>,
}

impl InvestigationEngine {
    /// Create an engine with no sources registered.
    ///
    /// # Errors
    /// Returns `EngineError::Config` when the configuration is invalid.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self {
            config,
            sources: Vec::new(),
            in_flight: Mutex::new(HashSet::new()),
            last: RwLock::new(None),
        })
    }

    /// Register a source adapter, creating its governor from the given
    /// rate configuration. Builder-style, called at wiring time.
    pub fn with_source(
        mut self,
        adapter: Arc<dyn SourceAdapter>,
        governor_config: GovernorConfig,
    ) -> Self {
        let governor = Arc::new(RateGovernor::new(adapter.source(), governor_config));
        self.sources.push(SourceHandle { adapter, governor });
        self
    }

    /// Sources currently registered.
    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|s| s.adapter.source()).collect()
    }

    /// Run a full investigation for the named target.
    ///
    /// Always yields a record when it runs at all: per-source failures are
    /// recorded on it rather than surfaced as errors. The only error paths
    /// are a duplicate in-flight target and an invalid engine setup.
    pub async fn start_investigation(
        &self,
        raw_name: &str,
    ) -> Result<Arc<InvestigationRecord>, EngineError> {
        let target = TargetQuery::new(raw_name);
        let key = target.name.to_lowercase();

        {
            let mut in_flight = self.in_flight.lock().expect("in-flight lock poisoned");
            if !in_flight.insert(key.clone()) {
                return Err(EngineError::AlreadyInProgress(target.name));
            }
        }
        let _guard = InFlightGuard {
            set: &self.in_flight,
            key,
        };

        info!(target = %target.name, "starting investigation");
        let investigation = Investigation {
            config: &self.config,
            sources: &self.sources,
            target,
            phase: Phase::Idle,
        };
        let record = Arc::new(investigation.run().await);

        *self.last.write().expect("record lock poisoned") = Some(Arc::clone(&record));
        Ok(record)
    }

    /// The most recently completed investigation record.
    pub fn current_record(&self) -> Result<Arc<InvestigationRecord>, EngineError> {
        self.last
            .read()
            .expect("record lock poisoned")
            .clone()
            .ok_or(EngineError::NoActiveInvestigation)
    }
}

/// Removes the target from the in-flight set even when a run panics.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.key);
        }
    }
}

/// One single-use investigation run.
struct Investigation<'a> {
    config: &'a EngineConfig,
    sources: &'a [SourceHandle],
    target: TargetQuery,
    phase: Phase,
}

impl Investigation<'_> {
    fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance(next),
            "illegal phase transition {} -> {}",
            self.phase,
            next
        );
        debug!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }

    async fn run(mut self) -> InvestigationRecord {
        let started_at = unix_ms();
        let deadline = Instant::now() + self.config.overall_deadline();

        self.advance(Phase::Dispatching);
        let (hits, source_errors) = self.dispatch(deadline).await;
        let hits = self.enrich(hits, deadline).await;

        self.advance(Phase::Aggregating);
        let (candidates, links, fault) = self.aggregate(hits);

        let status = if fault.is_some() {
            self.advance(Phase::Failed);
            InvestigationStatus::Partial
        } else {
            self.advance(Phase::Complete);
            InvestigationRecord::status_from_errors(&source_errors)
        };

        info!(
            target = %self.target.name,
            status = %status,
            candidates = candidates.len(),
            links = links.len(),
            failed_sources = source_errors.len(),
            "investigation finished"
        );

        InvestigationRecord {
            target: self.target.clone(),
            candidates,
            links,
            source_errors,
            started_at,
            completed_at: unix_ms(),
            status,
            fault,
        }
    }

    /// Fan out one task per source over the bounded worker pool, draining
    /// hits as they arrive until every task has settled.
    async fn dispatch(
        &self,
        deadline: Instant,
    ) -> (Vec<RawHit>, BTreeMap<SourceId, SourceErrorKind>) {
        let (tx, mut rx) = mpsc::channel::<RawHit>(self.config.hit_buffer);
        let pool = Arc::new(Semaphore::new(self.config.max_concurrent_sources));
        let mut tasks: JoinSet<(SourceId, Result<usize, SourceError>)> = JoinSet::new();

        for handle in self.sources {
            let adapter = Arc::clone(&handle.adapter);
            let governor = Arc::clone(&handle.governor);
            let pool = Arc::clone(&pool);
            let tx = tx.clone();
            let target = self.target.clone();

            tasks.spawn(async move {
                let source = adapter.source();
                let _permit = match pool.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (source, Err(SourceError::Transient("worker pool closed".into())))
                    }
                };

                if let Err(e) = governor.acquire(deadline).await {
                    let err = match e {
                        GovernorError::DeadlineElapsed(_) => SourceError::Transient(e.to_string()),
                        GovernorError::SourceUnavailable(_) => SourceError::Blocked(e.to_string()),
                    };
                    return (source, Err(err));
                }

                let result = match timeout_at(deadline, adapter.search(&target, deadline, tx)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Transient(
                        "investigation deadline elapsed".into(),
                    )),
                };

                if let Some(outcome) = outcome_for(&result) {
                    governor.report_outcome(outcome);
                }
                (source, result)
            });
        }
        drop(tx);

        // partial results accumulate as they arrive; the channel closes
        // once every task has dropped its sender
        let mut hits = Vec::new();
        while let Some(hit) = rx.recv().await {
            debug!(source = %hit.source, url = %hit.url, "hit received");
            hits.push(hit);
        }

        let mut source_errors = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((source, Ok(emitted))) => {
                    info!(%source, emitted, "source settled");
                }
                Ok((source, Err(e))) => {
                    warn!(%source, error = %e, "source failed");
                    source_errors.insert(source, e.kind());
                }
                Err(join_error) => {
                    error!(error = %join_error, "source task aborted");
                }
            }
        }

        (hits, source_errors)
    }

    /// Best-effort detail enrichment for the most promising hits of each
    /// source. Failures leave the original hit in place; a CAPTCHA here
    /// still latches the source's governor.
    async fn enrich(&self, mut hits: Vec<RawHit>, deadline: Instant) -> Vec<RawHit> {
        for handle in self.sources {
            let source = handle.adapter.source();

            let mut indices: Vec<usize> = (0..hits.len())
                .filter(|&i| hits[i].source == source)
                .collect();
            indices.sort_by(|&a, &b| {
                hits[b]
                    .confidence
                    .partial_cmp(&hits[a].confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            for &idx in indices.iter().take(self.config.detail_limit) {
                if handle.governor.acquire(deadline).await.is_err() {
                    break;
                }

                let fetched = timeout_at(deadline, handle.adapter.fetch_detail(&hits[idx], deadline))
                    .await
                    .unwrap_or_else(|_| {
                        Err(SourceError::Transient("investigation deadline elapsed".into()))
                    });

                match fetched {
                    Ok(enriched) => {
                        handle.governor.report_outcome(Outcome::Success);
                        hits[idx] = enriched;
                    }
                    Err(e) => {
                        debug!(%source, error = %e, "detail fetch skipped");
                        let blocked = matches!(e.kind(), SourceErrorKind::Blocked);
                        if let Some(outcome) = outcome_for_error(&e) {
                            handle.governor.report_outcome(outcome);
                        }
                        if blocked {
                            break;
                        }
                    }
                }
            }
        }
        hits
    }

    /// Sequential aggregation phases over the collected hits. A fault in
    /// either phase is returned as a tag; candidates already computed are
    /// kept.
    fn aggregate(
        &self,
        hits: Vec<RawHit>,
    ) -> (
        Vec<dossier_domain::Candidate>,
        Vec<dossier_domain::ValidationLink>,
        Option<String>,
    ) {
        let matcher = match CandidateMatcher::new(self.config.matcher.clone()) {
            Ok(matcher) => matcher,
            Err(e) => return (Vec::new(), Vec::new(), Some(fault_tag(e))),
        };
        let validator = match CrossValidator::new(self.config.validator.clone()) {
            Ok(validator) => validator,
            Err(e) => return (Vec::new(), Vec::new(), Some(fault_tag(e))),
        };

        let mut candidates = match matcher.assemble(hits) {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(error = %e, "candidate assembly faulted");
                return (Vec::new(), Vec::new(), Some(fault_tag(e)));
            }
        };

        match validator.validate(&mut candidates) {
            Ok(links) => (candidates, links, None),
            Err(e) => {
                error!(error = %e, "cross-validation faulted");
                (candidates, Vec::new(), Some(fault_tag(e)))
            }
        }
    }
}

fn fault_tag(e: impl std::fmt::Display) -> String {
    EngineError::AggregationFault(e.to_string()).to_string()
}

/// What the governor should hear about a call result. `NotFound` is a
/// successful call; transient and fatal outcomes say nothing about rate
/// limits, so they are not reported at all.
fn outcome_for<T>(result: &Result<T, SourceError>) -> Option<Outcome> {
    match result {
        Ok(_) => Some(Outcome::Success),
        Err(e) => outcome_for_error(e),
    }
}

fn outcome_for_error(e: &SourceError) -> Option<Outcome> {
    match e.kind() {
        SourceErrorKind::RateLimited => Some(Outcome::RateLimited),
        SourceErrorKind::Blocked => Some(Outcome::Blocked),
        SourceErrorKind::NotFound => Some(Outcome::Success),
        SourceErrorKind::Transient | SourceErrorKind::Fatal => None,
    }
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.hit_buffer = 0;
        assert!(matches!(
            InvestigationEngine::new(config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_current_record_before_any_run() {
        let engine = InvestigationEngine::new(EngineConfig::default()).unwrap();
        assert!(matches!(
            engine.current_record(),
            Err(EngineError::NoActiveInvestigation)
        ));
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(outcome_for(&Ok(1usize)), Some(Outcome::Success));
        assert_eq!(
            outcome_for::<usize>(&Err(SourceError::NotFound("x".into()))),
            Some(Outcome::Success)
        );
        assert_eq!(
            outcome_for::<usize>(&Err(SourceError::RateLimited("x".into()))),
            Some(Outcome::RateLimited)
        );
        assert_eq!(
            outcome_for::<usize>(&Err(SourceError::Blocked("x".into()))),
            Some(Outcome::Blocked)
        );
        assert_eq!(outcome_for::<usize>(&Err(SourceError::Fatal("x".into()))), None);
    }
}
