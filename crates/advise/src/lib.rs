//! Purchase advice based on a user's owned items.
//!
//! Evaluates a prospective purchase against the user's item history and
//! spending profile. Four independent risk factors (duplicate, budget,
//! impulse, category overuse) are averaged into a recommendation with
//! reasons, similar owned items, alternatives, and a price analysis.

mod config;
mod feedback;
mod profile;

pub use config::{AdviceConfig, ConfidenceFloors, ConfigError, RangeFactors, ReportThresholds};
pub use feedback::{AdaptationPolicy, FeedbackConfig, NoAdaptation, ScaleThresholds};
pub use profile::{trailing_month_start, SpendingProfile, SpendingThresholds};

use chrono::{Local, NaiveDate};
use stashwise_explain::{alternative_text, best_time_to_buy, explain_advice_reason};
use stashwise_features::item_name_similarity;
use stashwise_model::{
    AdviceReason, AdviceRequest, AdviceType, AlternativeKind, AlternativeOption, Category,
    FeedbackContext, FeedbackDecision, Item, MarketAnalysis, PriceRange, PriceTrend,
    PurchaseAdvice, RiskFactors, SimilarItem,
};

/// Risk factors plus the facts the decision needs besides them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub factors: RiskFactors,
    /// Owned items whose names are near-duplicates of the candidate
    pub duplicates: usize,
    /// Spending to date plus the price exceeds the monthly budget
    pub over_budget: bool,
}

/// Gives purchase advice for one user session.
///
/// Holds the user's item history, the derived spending profile, and the
/// adaptation policy. Mutating calls take `&mut self`; share an instance
/// across threads only behind a lock.
#[derive(Debug)]
pub struct PurchaseAdvisor {
    config: AdviceConfig,
    policy: Box<dyn AdaptationPolicy>,
    items: Vec<Item>,
    categories: Vec<Category>,
    profile: SpendingProfile,
}

impl PurchaseAdvisor {
    /// Create an advisor that scales thresholds on feedback.
    pub fn new(config: AdviceConfig) -> Self {
        Self::with_policy(config, Box::new(ScaleThresholds::default()))
    }

    pub fn with_policy(config: AdviceConfig, policy: Box<dyn AdaptationPolicy>) -> Self {
        let thresholds = SpendingThresholds {
            monthly_budget: config.monthly_budget,
            average_item_price: config.average_item_price,
        };
        Self {
            config,
            policy,
            items: Vec::new(),
            categories: Vec::new(),
            profile: SpendingProfile::empty(thresholds),
        }
    }

    /// Replace the item history and rebuild the profile as of today.
    pub fn set_user_items(&mut self, items: Vec<Item>) {
        self.set_user_items_as_of(items, Local::now().date_naive());
    }

    /// Replace the item history and rebuild the profile as of `today`.
    pub fn set_user_items_as_of(&mut self, items: Vec<Item>, today: NaiveDate) {
        self.profile = SpendingProfile::build(&items, today, self.profile.thresholds);
        self.items = items;

        tracing::debug!(
            items = self.items.len(),
            categories = self.profile.category_spending.len(),
            total_spending = self.profile.total_spending(),
            "Rebuilt spending profile"
        );
    }

    /// Categories used to name categories in reasons.
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    pub fn profile(&self) -> &SpendingProfile {
        &self.profile
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Advise on a prospective purchase.
    pub fn purchase_advice(&self, request: &AdviceRequest) -> PurchaseAdvice {
        let price = request.effective_price();
        let assessment = self.assess_risk(&request.name, &request.category_id, price);
        let risk = assessment.factors;
        let total = risk.total();

        let mut advice_type = self.decide(total);
        if assessment.over_budget && self.config.over_budget_floor && advice_type == AdviceType::Buy {
            advice_type = AdviceType::Consider;
        }

        let floor = match advice_type {
            AdviceType::Avoid => self.config.floors.avoid,
            AdviceType::Wait => self.config.floors.wait,
            AdviceType::Consider => self.config.floors.consider,
            AdviceType::Buy => self.config.floors.buy,
        };
        let confidence = (1.0 - total).max(floor).clamp(0.0, 1.0);

        let reasons = self
            .reasons(&assessment, &request.category_id)
            .iter()
            .map(explain_advice_reason)
            .collect();

        tracing::debug!(
            name = %request.name,
            category_id = %request.category_id,
            price,
            duplicate = risk.duplicate,
            budget = risk.budget,
            impulse = risk.impulse,
            category_overuse = risk.category_overuse,
            total,
            advice = advice_type.label(),
            "Purchase advice"
        );

        PurchaseAdvice {
            advice_type,
            confidence,
            reasons,
            risk,
            similar_items: self.similar_items(&request.name, &request.category_id),
            alternatives: self.alternatives(price, advice_type),
            market_analysis: self.market_analysis(price, &request.category_id),
        }
    }

    /// Compute the four risk factors for a candidate purchase.
    pub fn assess_risk(&self, name: &str, category_id: &str, price: f64) -> RiskAssessment {
        let config = &self.config;
        let thresholds = self.profile.thresholds;

        let duplicates = self
            .items
            .iter()
            .filter(|item| item_name_similarity(name, &item.name) > config.duplicate_similarity)
            .count();
        let duplicate = (duplicates as f64 * config.duplicate_step).min(1.0);

        let total_spending = self.profile.total_spending();
        let over_budget = total_spending + price > thresholds.monthly_budget;
        let budget = if over_budget {
            config.over_budget_risk
        } else if price > thresholds.average_item_price * config.expensive_multiplier {
            config.expensive_risk
        } else {
            0.0
        };

        let recent = self.profile.recent_purchases(category_id);
        let impulse = if recent >= config.impulse_high_count {
            config.impulse_high_risk
        } else if recent >= config.impulse_low_count {
            config.impulse_low_risk
        } else {
            0.0
        };

        let category_overuse = if self.profile.category_spending(category_id)
            > self.profile.mean_category_spending() * config.overuse_multiplier
        {
            config.overuse_risk
        } else {
            0.0
        };

        RiskAssessment {
            factors: RiskFactors {
                duplicate,
                budget,
                impulse,
                category_overuse,
            },
            duplicates,
            over_budget,
        }
    }

    /// Owned items resembling the candidate, most similar first.
    pub fn similar_items(&self, name: &str, category_id: &str) -> Vec<SimilarItem> {
        let mut similar: Vec<SimilarItem> = self
            .items
            .iter()
            .filter_map(|item| {
                let similarity = item_name_similarity(name, &item.name);
                let same_category = item.category_id == category_id;
                let keep = similarity > self.config.similar_threshold
                    || (similarity > self.config.similar_same_category_threshold && same_category);
                keep.then(|| SimilarItem {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    image_url: item.primary_image().to_string(),
                    similarity_score: similarity,
                })
            })
            .collect();

        similar.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        similar.truncate(self.config.max_similar_items);
        similar
    }

    /// Apply user feedback to the thresholds used by later calls.
    pub fn learn_from_feedback(&mut self, decision: FeedbackDecision, context: &FeedbackContext) {
        tracing::info!(
            ?decision,
            item = %context.item_name,
            policy = self.policy.name(),
            "Purchase advice feedback"
        );
        self.policy
            .adapt(decision, context, &mut self.profile.thresholds);
    }

    fn decide(&self, total: f64) -> AdviceType {
        if total > self.config.avoid_above {
            AdviceType::Avoid
        } else if total > self.config.wait_above {
            AdviceType::Wait
        } else if total > self.config.consider_above {
            AdviceType::Consider
        } else {
            AdviceType::Buy
        }
    }

    fn reasons(&self, assessment: &RiskAssessment, category_id: &str) -> Vec<AdviceReason> {
        let report = &self.config.report;
        let risk = &assessment.factors;
        let mut reasons = Vec::new();

        if risk.duplicate > report.duplicate {
            reasons.push(AdviceReason::Duplicate {
                similar_count: assessment.duplicates,
            });
        }
        if risk.budget > report.budget {
            reasons.push(AdviceReason::Budget);
        }
        if risk.impulse > report.impulse {
            reasons.push(AdviceReason::Impulse {
                category: self.category_name(category_id),
            });
        }
        if risk.category_overuse > report.category_overuse {
            reasons.push(AdviceReason::CategoryOveruse);
        }

        if reasons.is_empty() {
            reasons.push(AdviceReason::Reasonable);
        }
        reasons
    }

    fn alternatives(&self, price: f64, advice_type: AdviceType) -> Vec<AlternativeOption> {
        let floor = self.config.price_floor;
        let mut alternatives = Vec::new();

        if matches!(advice_type, AdviceType::Avoid | AdviceType::Wait) {
            alternatives.push(alternative(AlternativeKind::UseExisting, None));
        }

        if price > self.profile.thresholds.average_item_price {
            let factors = &self.config.cheaper_range;
            alternatives.push(alternative(
                AlternativeKind::CheaperAlternative,
                Some(PriceRange::bounded(price * factors.low, price * factors.high, floor)),
            ));
        }

        if advice_type == AdviceType::Consider {
            let factors = &self.config.promotion_range;
            alternatives.push(alternative(
                AlternativeKind::WaitForPromotion,
                Some(PriceRange::bounded(price * factors.low, price * factors.high, floor)),
            ));
        }

        alternatives
    }

    fn market_analysis(&self, price: f64, category_id: &str) -> MarketAnalysis {
        let average = self
            .profile
            .category_average_price(category_id)
            .unwrap_or(price);

        let trend = if price > average * self.config.trend_up {
            PriceTrend::Up
        } else if price < average * self.config.trend_down {
            PriceTrend::Down
        } else {
            PriceTrend::Stable
        };

        MarketAnalysis {
            average_price: average.round(),
            price_trend: trend,
            best_time_to_buy: best_time_to_buy(trend).to_string(),
        }
    }

    fn category_name(&self, category_id: &str) -> String {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| category_id.to_string())
    }
}

fn alternative(kind: AlternativeKind, price_range: Option<PriceRange>) -> AlternativeOption {
    let (name, reason) = alternative_text(kind);
    AlternativeOption {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
        price_range,
    }
}
