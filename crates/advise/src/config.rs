//! Tunable constants for purchase advice.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("'{0}' must be positive (got {1})")]
    NotPositive(&'static str, f64),
    #[error("'{0}' must be within [0, 1] (got {1})")]
    OutOfRange(&'static str, f64),
    #[error("Price range '{0}' is inverted ({1} > {2})")]
    InvertedRange(&'static str, f64, f64),
}

/// Confidence floor per advice type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceFloors {
    pub avoid: f64,
    pub wait: f64,
    pub consider: f64,
    pub buy: f64,
}

impl Default for ConfidenceFloors {
    fn default() -> Self {
        Self {
            avoid: 0.8,
            wait: 0.6,
            consider: 0.4,
            buy: 0.7,
        }
    }
}

/// A risk factor is reported as a reason only above its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportThresholds {
    pub duplicate: f64,
    pub budget: f64,
    pub impulse: f64,
    pub category_overuse: f64,
}

impl Default for ReportThresholds {
    fn default() -> Self {
        Self {
            duplicate: 0.5,
            budget: 0.5,
            impulse: 0.4,
            category_overuse: 0.4,
        }
    }
}

/// Price range as fractions of the asked price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFactors {
    pub low: f64,
    pub high: f64,
}

/// Configuration for the purchase advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    /// Starting monthly budget (adjusted by feedback)
    pub monthly_budget: f64,
    /// Starting reference price of a typical item (adjusted by feedback)
    pub average_item_price: f64,

    /// Name similarity above which an owned item counts as a duplicate
    pub duplicate_similarity: f64,
    /// Duplicate risk added per duplicate
    pub duplicate_step: f64,

    pub over_budget_risk: f64,
    pub expensive_risk: f64,
    /// Price above this multiple of the average item price is "expensive"
    pub expensive_multiplier: f64,

    pub impulse_high_risk: f64,
    pub impulse_high_count: usize,
    pub impulse_low_risk: f64,
    pub impulse_low_count: usize,

    pub overuse_risk: f64,
    /// Category spend above this multiple of the per-category mean is overuse
    pub overuse_multiplier: f64,

    pub avoid_above: f64,
    pub wait_above: f64,
    pub consider_above: f64,
    pub floors: ConfidenceFloors,
    pub report: ReportThresholds,
    /// Never answer `buy` when the purchase breaks the budget
    pub over_budget_floor: bool,

    pub similar_threshold: f64,
    pub similar_same_category_threshold: f64,
    pub max_similar_items: usize,

    /// Lowest price any suggested range may start at
    pub price_floor: f64,
    pub cheaper_range: RangeFactors,
    pub promotion_range: RangeFactors,

    pub trend_up: f64,
    pub trend_down: f64,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            monthly_budget: 2000.0,
            average_item_price: 150.0,
            duplicate_similarity: 0.7,
            duplicate_step: 0.3,
            over_budget_risk: 0.8,
            expensive_risk: 0.6,
            expensive_multiplier: 2.0,
            impulse_high_risk: 0.7,
            impulse_high_count: 3,
            impulse_low_risk: 0.4,
            impulse_low_count: 2,
            overuse_risk: 0.6,
            overuse_multiplier: 2.0,
            avoid_above: 0.7,
            wait_above: 0.5,
            consider_above: 0.3,
            floors: ConfidenceFloors::default(),
            report: ReportThresholds::default(),
            over_budget_floor: true,
            similar_threshold: 0.5,
            similar_same_category_threshold: 0.3,
            max_similar_items: 3,
            price_floor: 10.0,
            cheaper_range: RangeFactors { low: 0.5, high: 0.8 },
            promotion_range: RangeFactors { low: 0.7, high: 0.9 },
            trend_up: 1.2,
            trend_down: 0.8,
        }
    }
}

impl AdviceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("monthly_budget", self.monthly_budget),
            ("average_item_price", self.average_item_price),
            ("expensive_multiplier", self.expensive_multiplier),
            ("overuse_multiplier", self.overuse_multiplier),
            ("trend_up", self.trend_up),
            ("trend_down", self.trend_down),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive(field, value));
            }
        }

        let unit = [
            ("duplicate_similarity", self.duplicate_similarity),
            ("duplicate_step", self.duplicate_step),
            ("over_budget_risk", self.over_budget_risk),
            ("expensive_risk", self.expensive_risk),
            ("impulse_high_risk", self.impulse_high_risk),
            ("impulse_low_risk", self.impulse_low_risk),
            ("overuse_risk", self.overuse_risk),
            ("avoid_above", self.avoid_above),
            ("wait_above", self.wait_above),
            ("consider_above", self.consider_above),
            ("floors.avoid", self.floors.avoid),
            ("floors.wait", self.floors.wait),
            ("floors.consider", self.floors.consider),
            ("floors.buy", self.floors.buy),
            ("similar_threshold", self.similar_threshold),
            ("similar_same_category_threshold", self.similar_same_category_threshold),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange(field, value));
            }
        }

        for (field, range) in [
            ("cheaper_range", &self.cheaper_range),
            ("promotion_range", &self.promotion_range),
        ] {
            if range.low.is_nan() || range.high.is_nan() || range.low > range.high {
                return Err(ConfigError::InvertedRange(field, range.low, range.high));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert_eq!(AdviceConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = AdviceConfig {
            monthly_budget: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive("monthly_budget", 0.0))
        );
    }

    #[test]
    fn test_nan_rejected() {
        let config = AdviceConfig {
            monthly_budget: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive("monthly_budget", _))
        ));

        let config = AdviceConfig {
            promotion_range: RangeFactors { low: f64::NAN, high: 0.9 },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange("promotion_range", _, _))
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = AdviceConfig {
            cheaper_range: RangeFactors { low: 0.9, high: 0.5 },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange("cheaper_range", _, _))
        ));
    }
}
