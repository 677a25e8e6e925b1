//! Tunable constants for category scoring.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Weight '{0}' must not be negative (got {1})")]
    NegativeWeight(&'static str, f64),
    #[error("'{0}' must be within [0, 1] (got {1})")]
    OutOfRange(&'static str, f64),
}

/// Which scoring strategy the suggester uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Keyword overlap + name/description similarity + history, weighted
    #[default]
    Weighted,
    /// Plain count of taxonomy keywords found in the text
    KeywordHits,
}

/// Weights of the four weighted sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub keyword: f64,
    pub name: f64,
    pub description: f64,
    pub history: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            keyword: 0.4,
            name: 0.3,
            description: 0.2,
            history: 0.1,
        }
    }
}

/// Linear hit-count → confidence mapping: `min(base + step * hits, cap)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitMapping {
    pub base: f64,
    pub step: f64,
    pub cap: f64,
}

impl HitMapping {
    pub fn confidence(&self, hits: f64) -> f64 {
        (self.base + self.step * hits).min(self.cap)
    }
}

/// Configuration for the category suggester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub mode: ScoringMode,
    pub weights: CategoryWeights,
    /// Name similarity must exceed this to count
    pub name_threshold: f64,
    /// Description similarity must exceed this to count
    pub description_threshold: f64,
    pub max_confidence: f64,
    pub max_alternative_confidence: f64,
    pub max_alternatives: usize,
    pub max_reasons: usize,
    pub fallback_confidence: f64,
    pub winner_hits: HitMapping,
    pub alternative_hits: HitMapping,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::Weighted,
            weights: CategoryWeights::default(),
            name_threshold: 0.3,
            description_threshold: 0.2,
            max_confidence: 0.95,
            max_alternative_confidence: 0.9,
            max_alternatives: 3,
            max_reasons: 3,
            fallback_confidence: 0.3,
            winner_hits: HitMapping {
                base: 0.6,
                step: 0.1,
                cap: 0.95,
            },
            alternative_hits: HitMapping {
                base: 0.4,
                step: 0.1,
                cap: 0.8,
            },
        }
    }
}

impl CategoryConfig {
    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("weights.keyword", self.weights.keyword),
            ("weights.name", self.weights.name),
            ("weights.description", self.weights.description),
            ("weights.history", self.weights.history),
        ];
        for (field, value) in weights {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::NegativeWeight(field, value));
            }
        }

        let unit = [
            ("name_threshold", self.name_threshold),
            ("description_threshold", self.description_threshold),
            ("max_confidence", self.max_confidence),
            ("max_alternative_confidence", self.max_alternative_confidence),
            ("fallback_confidence", self.fallback_confidence),
            ("winner_hits.base", self.winner_hits.base),
            ("winner_hits.step", self.winner_hits.step),
            ("winner_hits.cap", self.winner_hits.cap),
            ("alternative_hits.base", self.alternative_hits.base),
            ("alternative_hits.step", self.alternative_hits.step),
            ("alternative_hits.cap", self.alternative_hits.cap),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange(field, value));
            }
        }

        Ok(())
    }
}
