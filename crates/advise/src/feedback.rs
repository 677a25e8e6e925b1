//! Session-scoped adaptation to user feedback.
//!
//! A policy may rescale the advisor's budget thresholds when the user
//! accepts or rejects advice. Nothing is persisted; the effect lasts as
//! long as the advisor instance.

use crate::config::ConfigError;
use crate::profile::SpendingThresholds;
use serde::{Deserialize, Serialize};
use stashwise_model::{FeedbackContext, FeedbackDecision};
use std::fmt::Debug;

/// Trait for feedback adaptation policies.
pub trait AdaptationPolicy: Debug + Send + Sync {
    /// Policy name for logging.
    fn name(&self) -> &'static str;

    /// Adjust `thresholds` in response to one piece of feedback.
    fn adapt(
        &mut self,
        decision: FeedbackDecision,
        context: &FeedbackContext,
        thresholds: &mut SpendingThresholds,
    );
}

/// Multiplicative factors applied per decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub rejected_factor: f64,
    pub accepted_factor: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            rejected_factor: 0.9,
            accepted_factor: 1.1,
        }
    }
}

impl FeedbackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("rejected_factor", self.rejected_factor),
            ("accepted_factor", self.accepted_factor),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive(field, value));
            }
        }
        Ok(())
    }
}

/// Scales the monthly budget and the average item price together.
///
/// Ignored feedback leaves both untouched.
#[derive(Debug, Clone, Default)]
pub struct ScaleThresholds {
    config: FeedbackConfig,
}

impl ScaleThresholds {
    pub fn new(config: FeedbackConfig) -> Self {
        Self { config }
    }
}

impl AdaptationPolicy for ScaleThresholds {
    fn name(&self) -> &'static str {
        "scale_thresholds"
    }

    fn adapt(
        &mut self,
        decision: FeedbackDecision,
        context: &FeedbackContext,
        thresholds: &mut SpendingThresholds,
    ) {
        let factor = match decision {
            FeedbackDecision::Rejected => self.config.rejected_factor,
            FeedbackDecision::Accepted => self.config.accepted_factor,
            FeedbackDecision::Ignored => return,
        };

        thresholds.monthly_budget *= factor;
        thresholds.average_item_price *= factor;

        tracing::info!(
            ?decision,
            item = %context.item_name,
            factor,
            monthly_budget = thresholds.monthly_budget,
            average_item_price = thresholds.average_item_price,
            "Adjusted spending thresholds"
        );
    }
}

/// Records nothing and changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdaptation;

impl AdaptationPolicy for NoAdaptation {
    fn name(&self) -> &'static str {
        "none"
    }

    fn adapt(
        &mut self,
        _decision: FeedbackDecision,
        _context: &FeedbackContext,
        _thresholds: &mut SpendingThresholds,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> SpendingThresholds {
        SpendingThresholds {
            monthly_budget: 2000.0,
            average_item_price: 150.0,
        }
    }

    #[test]
    fn test_scale_on_rejection_and_acceptance() {
        let mut policy = ScaleThresholds::default();
        let context = FeedbackContext::default();

        let mut t = thresholds();
        policy.adapt(FeedbackDecision::Rejected, &context, &mut t);
        assert!((t.monthly_budget - 1800.0).abs() < 1e-9);
        assert!((t.average_item_price - 135.0).abs() < 1e-9);

        let mut t = thresholds();
        policy.adapt(FeedbackDecision::Accepted, &context, &mut t);
        assert!((t.monthly_budget - 2200.0).abs() < 1e-9);
        assert!((t.average_item_price - 165.0).abs() < 1e-9);
    }

    #[test]
    fn test_ignored_and_no_adaptation_leave_thresholds() {
        let context = FeedbackContext::default();

        let mut t = thresholds();
        ScaleThresholds::default().adapt(FeedbackDecision::Ignored, &context, &mut t);
        assert_eq!(t, thresholds());

        let mut t = thresholds();
        NoAdaptation.adapt(FeedbackDecision::Rejected, &context, &mut t);
        assert_eq!(t, thresholds());
    }

    #[test]
    fn test_config_validation() {
        let config = FeedbackConfig {
            rejected_factor: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive("rejected_factor", 0.0))
        );
    }

    #[test]
    fn test_nan_rejected() {
        let config = FeedbackConfig {
            accepted_factor: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive("accepted_factor", _))
        ));
    }
}
