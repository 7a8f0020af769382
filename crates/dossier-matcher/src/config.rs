//! Configuration for the Candidate Matcher

use dossier_domain::similarity::{self, SimilarityConfig};
use serde::{Deserialize, Serialize};

/// Configuration for candidate matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum similarity for a merge
    pub merge_threshold: f64,

    /// Margin within which two merge choices count as ambiguous; ambiguity
    /// resolves to a new candidate rather than a merge
    pub tie_margin: f64,

    /// Weight of fuzzy name distance in the similarity blend
    pub name_weight: f64,

    /// Weight of exact field overlap in the similarity blend
    pub field_weight: f64,

    /// Per-extra-source bonus on the match score
    pub corroboration_bonus: f64,
}

impl MatcherConfig {
    /// The similarity parameters in the form the domain math takes.
    pub fn similarity(&self) -> SimilarityConfig {
        SimilarityConfig {
            merge_threshold: self.merge_threshold,
            tie_margin: self.tie_margin,
            name_weight: self.name_weight,
            field_weight: self.field_weight,
            corroboration_bonus: self.corroboration_bonus,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.merge_threshold) {
            return Err("merge_threshold must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.tie_margin) {
            return Err("tie_margin must be in [0, 1]".to_string());
        }
        if self.name_weight < 0.0 || self.field_weight < 0.0 {
            return Err("similarity weights must be non-negative".to_string());
        }
        if (self.name_weight + self.field_weight) == 0.0 {
            return Err("at least one similarity weight must be positive".to_string());
        }
        if self.corroboration_bonus < 0.0 {
            return Err("corroboration_bonus must be non-negative".to_string());
        }
        Ok(())
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            merge_threshold: similarity::MERGE_THRESHOLD,
            tie_margin: similarity::TIE_MARGIN,
            name_weight: similarity::NAME_WEIGHT,
            field_weight: similarity::FIELD_WEIGHT,
            corroboration_bonus: similarity::CORROBORATION_BONUS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MatcherConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = MatcherConfig::default();
        config.merge_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = MatcherConfig::default();
        config.name_weight = 0.0;
        config.field_weight = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = MatcherConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: MatcherConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.merge_threshold, parsed.merge_threshold);
        assert_eq!(config.corroboration_bonus, parsed.corroboration_bonus);
    }
}
