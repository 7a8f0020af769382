//! Configuration for the Rate Governor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one source's admission control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Token bucket capacity (calls per refill interval)
    pub capacity: u32,

    /// Bucket refill interval (milliseconds)
    pub refill_interval_ms: u64,

    /// Base backoff delay after the first rate-limit response (milliseconds)
    pub backoff_base_ms: u64,

    /// Backoff ceiling (milliseconds)
    pub backoff_cap_ms: u64,

    /// Jitter fraction applied to each backoff delay (0.2 = ±20%)
    pub jitter_frac: f64,
}

impl GovernorConfig {
    /// Get the refill interval as a Duration
    pub fn refill_interval(&self) -> Duration {
        Duration::from_millis(self.refill_interval_ms)
    }

    /// Preset for authenticated JSON APIs, which tolerate a higher call rate
    pub fn code_host() -> Self {
        Self {
            capacity: 30,
            ..Self::default()
        }
    }

    /// Preset for scraped search engines, which do not
    pub fn search_engine() -> Self {
        Self {
            capacity: 10,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".to_string());
        }
        if self.refill_interval_ms == 0 {
            return Err("refill_interval_ms must be greater than 0".to_string());
        }
        if self.backoff_base_ms == 0 {
            return Err("backoff_base_ms must be greater than 0".to_string());
        }
        if self.backoff_cap_ms < self.backoff_base_ms {
            return Err("backoff_cap_ms cannot be below backoff_base_ms".to_string());
        }
        if !(0.0..1.0).contains(&self.jitter_frac) {
            return Err("jitter_frac must be in [0, 1)".to_string());
        }
        Ok(())
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            refill_interval_ms: 60_000,
            backoff_base_ms: 500,
            backoff_cap_ms: 60_000,
            jitter_frac: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GovernorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(GovernorConfig::code_host().validate().is_ok());
        assert!(GovernorConfig::search_engine().validate().is_ok());
    }

    #[test]
    fn test_invalid_capacity() {
        let mut config = GovernorConfig::default();
        config.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cap_below_base_rejected() {
        let mut config = GovernorConfig::default();
        config.backoff_cap_ms = config.backoff_base_ms - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GovernorConfig::code_host();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: GovernorConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.capacity, parsed.capacity);
        assert_eq!(config.backoff_cap_ms, parsed.backoff_cap_ms);
    }
}
