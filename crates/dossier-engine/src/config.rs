//! Configuration for the Investigation Engine

use dossier_matcher::MatcherConfig;
use dossier_validator::ValidatorConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Investigation Engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Overall deadline for one investigation (milliseconds), propagated
    /// to every adapter call and governor acquisition
    pub overall_deadline_ms: u64,

    /// Bound on concurrently running source tasks
    pub max_concurrent_sources: usize,

    /// Buffered capacity of the merged hit channel
    pub hit_buffer: usize,

    /// How many hits per source get a detail-fetch enrichment pass
    pub detail_limit: usize,

    /// Candidate matcher parameters
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Cross-validator parameters
    #[serde(default)]
    pub validator: ValidatorConfig,
}

impl EngineConfig {
    /// Get the overall deadline as a Duration
    pub fn overall_deadline(&self) -> Duration {
        Duration::from_millis(self.overall_deadline_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.overall_deadline_ms == 0 {
            return Err("overall_deadline_ms must be greater than 0".to_string());
        }
        if self.max_concurrent_sources == 0 {
            return Err("max_concurrent_sources must be greater than 0".to_string());
        }
        if self.hit_buffer == 0 {
            return Err("hit_buffer must be greater than 0".to_string());
        }
        self.matcher.validate()?;
        self.validator.validate()?;
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overall_deadline_ms: 30_000,
            max_concurrent_sources: 4,
            hit_buffer: 64,
            detail_limit: 3,
            matcher: MatcherConfig::default(),
            validator: ValidatorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_deadline_rejected() {
        let mut config = EngineConfig::default();
        config.overall_deadline_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_worker_bound_rejected() {
        let mut config = EngineConfig::default();
        config.max_concurrent_sources = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nested_config_validation_propagates() {
        let mut config = EngineConfig::default();
        config.matcher.merge_threshold = 2.0;
        assert!(config.validate().is_err());
    }
}
