//! Configuration for the Cross-Validator

use serde::{Deserialize, Serialize};

/// Configuration for cross-validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Match-score boost per distinct confirming partner (capped at 1.0)
    pub confirm_boost: f64,

    /// Strength assigned to weak corroboration links
    pub weak_strength: f64,

    /// Strength assigned to contradiction links
    pub contradiction_strength: f64,
}

impl ValidatorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confirm_boost) {
            return Err("confirm_boost must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.weak_strength) {
            return Err("weak_strength must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.contradiction_strength) {
            return Err("contradiction_strength must be in [0, 1]".to_string());
        }
        Ok(())
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            confirm_boost: 0.15,
            weak_strength: 0.4,
            contradiction_strength: 0.8,
        }
    }
}
