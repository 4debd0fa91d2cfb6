use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid score weights: {0}")]
    InvalidWeights(String),
    #[error("Invalid interleave pattern: {0}")]
    InvalidInterleave(String),
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}

// Weighted terms must sum to at most 1.0; the badge bonus sits outside the
// sum and is uncapped.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights and normalization for the post scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Preference totals are divided by this before clamping to 1.0.
    pub preference_denominator: f64,
    pub tag_relevance: f64,
    pub related_bonus: f64,
    pub creator_affinity: f64,
    pub engagement: f64,
    pub viral: f64,
    pub freshness: f64,
    pub quality: f64,
    /// Per-day multiplier for freshness, `decay ^ days`.
    pub freshness_decay: f64,
    pub badge_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::recommendation()
    }
}

impl ScoreWeights {
    /// Weights used by the recommendation feed.
    pub fn recommendation() -> Self {
        Self {
            preference_denominator: 50.0,
            tag_relevance: 0.35,
            related_bonus: 0.10,
            creator_affinity: 0.15,
            engagement: 0.15,
            viral: 0.10,
            freshness: 0.10,
            quality: 0.05,
            freshness_decay: 0.95,
            badge_bonus: 0.25,
        }
    }

    /// Weights used by the simple chronological-ish feed.
    pub fn simple_feed() -> Self {
        Self {
            preference_denominator: 100.0,
            tag_relevance: 0.30,
            related_bonus: 0.05,
            creator_affinity: 0.15,
            engagement: 0.20,
            viral: 0.15,
            freshness: 0.10,
            quality: 0.05,
            freshness_decay: 0.95,
            badge_bonus: 0.25,
        }
    }

    pub fn weighted_sum(&self) -> f64 {
        self.tag_relevance
            + self.related_bonus
            + self.creator_affinity
            + self.engagement
            + self.viral
            + self.freshness
            + self.quality
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("tag_relevance", self.tag_relevance),
            ("related_bonus", self.related_bonus),
            ("creator_affinity", self.creator_affinity),
            ("engagement", self.engagement),
            ("viral", self.viral),
            ("freshness", self.freshness),
            ("quality", self.quality),
            ("badge_bonus", self.badge_bonus),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::InvalidWeights(format!(
                    "{name} must be a non-negative number, got {w}"
                )));
            }
        }

        let sum = self.weighted_sum();
        if sum > 1.0 + WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeights(format!(
                "weighted terms sum to {sum}, must be at most 1.0"
            )));
        }

        if !self.preference_denominator.is_finite() || self.preference_denominator <= 0.0 {
            return Err(ConfigError::InvalidWeights(format!(
                "preference_denominator must be positive, got {}",
                self.preference_denominator
            )));
        }

        if !(self.freshness_decay > 0.0 && self.freshness_decay <= 1.0) {
            return Err(ConfigError::InvalidWeights(format!(
                "freshness_decay must be in (0, 1], got {}",
                self.freshness_decay
            )));
        }

        Ok(())
    }
}

/// How the primary and secondary streams are woven together.
///
/// Each round takes `primary_per_round` items from the primary stream, plus
/// one more with probability `bonus_primary_chance`, then one item from the
/// secondary stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterleavePattern {
    pub primary_per_round: usize,
    pub bonus_primary_chance: f64,
}

impl Default for InterleavePattern {
    fn default() -> Self {
        Self::fixed()
    }
}

impl InterleavePattern {
    /// Two primary items then one secondary, every round.
    pub fn fixed() -> Self {
        Self {
            primary_per_round: 2,
            bonus_primary_chance: 0.0,
        }
    }

    /// Two or three primary items (coin flip) then one secondary.
    pub fn randomized() -> Self {
        Self {
            primary_per_round: 2,
            bonus_primary_chance: 0.5,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_per_round == 0 {
            return Err(ConfigError::InvalidInterleave(
                "primary_per_round must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.bonus_primary_chance) {
            return Err(ConfigError::InvalidInterleave(format!(
                "bonus_primary_chance must be in [0, 1], got {}",
                self.bonus_primary_chance
            )));
        }
        Ok(())
    }
}

/// Everything that shapes a feed other than the user's own signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub weights: ScoreWeights,
    pub interleave: InterleavePattern,
    pub max_same_creator_in_feed: usize,
    /// How many of the user's strongest tags seed related-tag expansion.
    pub top_tag_count: usize,
    pub candidate_pool_limit: usize,
    pub seen_lookback: usize,
    /// Apply the per-creator cap to continuation pages as well.
    pub diversify_continuation: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self::recommendation()
    }
}

impl RankingConfig {
    pub fn recommendation() -> Self {
        Self {
            weights: ScoreWeights::recommendation(),
            interleave: InterleavePattern::fixed(),
            max_same_creator_in_feed: 3,
            top_tag_count: 5,
            candidate_pool_limit: 500,
            seen_lookback: 1000,
            diversify_continuation: false,
        }
    }

    pub fn simple_feed() -> Self {
        Self {
            weights: ScoreWeights::simple_feed(),
            interleave: InterleavePattern::randomized(),
            ..Self::recommendation()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.interleave.validate()?;
        if self.max_same_creator_in_feed == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_same_creator_in_feed must be at least 1".into(),
            ));
        }
        if self.candidate_pool_limit == 0 {
            return Err(ConfigError::InvalidLimit(
                "candidate_pool_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RankingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        RankingConfig::recommendation().validate().unwrap();
        RankingConfig::simple_feed().validate().unwrap();
        assert!((ScoreWeights::recommendation().weighted_sum() - 1.0).abs() < 1e-9);
        assert!((ScoreWeights::simple_feed().weighted_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn overweight_rejected() {
        let mut weights = ScoreWeights::recommendation();
        weights.engagement = 0.5;
        assert!(matches!(weights.validate(), Err(ConfigError::InvalidWeights(_))));
    }

    #[test]
    fn bad_decay_rejected() {
        let mut weights = ScoreWeights::recommendation();
        weights.freshness_decay = 1.5;
        assert!(weights.validate().is_err());
        weights.freshness_decay = 0.0;
        assert!(weights.validate().is_err());
    }
}
