//! Core domain model for the stashwise inventory recommender.
//!
//! This crate defines the value objects shared by every other crate:
//! - `Category` / `Item`: snapshots handed in by the record store
//! - `CategorySuggestion`: output of the category scorer
//! - `PurchaseAdvice`: output of the purchase-advice scorer
//! - `Suggestion`: the typed feed entry a client displays
//! - `FeedbackDecision`: the signal a user sends back about advice

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Category id returned when no real category can be suggested.
pub const FALLBACK_CATEGORY_ID: &str = "other";

/// Category name returned when no real category can be suggested.
pub const FALLBACK_CATEGORY_NAME: &str = "其他";

/// A category as stored in the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }
}

/// Physical condition of an owned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    New,
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl ItemCondition {
    /// Wire name, as stored in the `condition` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like_new",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

/// One owned item (a historical purchase).
///
/// The core only ever reads snapshots of these; it never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,

    /// Owner of the item
    #[serde(default)]
    pub user_id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ItemCondition>,

    pub category_id: String,

    /// Purchase date (ISO date or RFC 3339 timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Photo URLs; accepted but never inspected
    #[serde(default)]
    pub image_urls: Vec<String>,

    /// Creation timestamp (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Item {
    /// Create a minimal item, mostly for tests and fixtures.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: String::new(),
            name: name.into(),
            description: None,
            brand: None,
            condition: None,
            category_id: category_id.into(),
            purchase_date: None,
            purchase_price: None,
            tags: Vec::new(),
            image_urls: Vec::new(),
            created_at: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.purchase_price = Some(price);
        self
    }

    pub fn with_purchase_date(mut self, date: impl Into<String>) -> Self {
        self.purchase_date = Some(date.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_urls.push(url.into());
        self
    }

    /// Purchase date as a calendar day, if present and parseable.
    pub fn purchase_day(&self) -> Option<NaiveDate> {
        self.purchase_date.as_deref().and_then(parse_day)
    }

    /// First photo, or an empty string.
    pub fn primary_image(&self) -> &str {
        self.image_urls.first().map(String::as_str).unwrap_or("")
    }
}

/// Parse an ISO date, naive timestamp, or RFC 3339 timestamp into a day.
pub fn parse_day(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.date())
}

/// Request for a category suggestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Accepted for API parity, never inspected
    #[serde(default)]
    pub image_urls: Vec<String>,

    #[serde(default)]
    pub user_id: String,
}

impl CategoryRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description, or empty text when absent.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Request for purchase advice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub name: String,

    pub category_id: String,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub user_id: String,
}

impl AdviceRequest {
    pub fn new(name: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category_id: category_id.into(),
            ..Default::default()
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Price, treating a missing or negative price as zero.
    pub fn effective_price(&self) -> f64 {
        self.price.unwrap_or(0.0).max(0.0)
    }
}

/// Why a category scored the way it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum CategoryReason {
    /// Fraction of extracted keywords found in the category's keyword set
    KeywordMatch { ratio: f64 },
    /// Similarity between the item name and the category name
    NameSimilarity { similarity: f64 },
    /// Similarity between the description and the category name
    DescriptionRelevance { similarity: f64 },
    /// Share of the user's items already in this category
    HistoryPreference { share: f64 },
    /// Number of taxonomy keywords found in the text
    KeywordHits { hits: usize },
    /// Analysis was based on the item's name and description
    TextAnalysis,
    /// The item fits the category's characteristics
    CategoryTraits { category: String },
    /// Nothing matched; generic rule applied
    Fallback,
}

/// An alternative category candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeCategory {
    pub category_id: String,
    pub category_name: String,
    pub confidence: f64,
}

/// Result of the category scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category_id: String,

    pub category_name: String,

    /// Self-reported certainty, at most 0.95
    pub confidence: f64,

    /// Rendered reasons, at most three
    pub reasons: Vec<String>,

    /// Runner-up categories, at most three
    #[serde(default)]
    pub alternatives: Vec<AlternativeCategory>,
}

impl CategorySuggestion {
    pub fn is_fallback(&self) -> bool {
        self.category_id == FALLBACK_CATEGORY_ID && self.category_name == FALLBACK_CATEGORY_NAME
    }
}

/// Purchase recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceType {
    Buy,
    Consider,
    Wait,
    Avoid,
}

impl AdviceType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Consider => "consider",
            Self::Wait => "wait",
            Self::Avoid => "avoid",
        }
    }
}

/// The four independent purchase risk signals, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub duplicate: f64,
    pub budget: f64,
    pub impulse: f64,
    pub category_overuse: f64,
}

impl RiskFactors {
    /// Unweighted mean of the four factors.
    pub fn total(&self) -> f64 {
        (self.duplicate + self.budget + self.impulse + self.category_overuse) / 4.0
    }
}

/// A reason attached to purchase advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum AdviceReason {
    /// Similar items already owned
    Duplicate { similar_count: usize },
    /// Price strains the budget
    Budget,
    /// Frequent recent purchases in the category
    Impulse { category: String },
    /// Category spending well above the user's norm
    CategoryOveruse,
    /// No risk worth reporting
    Reasonable,
}

/// An owned item that resembles the prospective purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarItem {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub similarity_score: f64,
}

/// Inclusive price interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Build a range whose bounds satisfy `floor <= min <= max`.
    pub fn bounded(min: f64, max: f64, floor: f64) -> Self {
        let min = min.max(floor);
        Self {
            min,
            max: max.max(min),
        }
    }
}

/// Kind of alternative to buying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeKind {
    UseExisting,
    CheaperAlternative,
    WaitForPromotion,
}

/// An alternative to the prospective purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeOption {
    pub kind: AlternativeKind,

    pub name: String,

    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
}

/// Direction of the asked price relative to the user's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub average_price: f64,
    pub price_trend: PriceTrend,
    pub best_time_to_buy: String,
}

/// Result of the purchase-advice scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseAdvice {
    #[serde(rename = "type")]
    pub advice_type: AdviceType,

    pub confidence: f64,

    pub reasons: Vec<String>,

    /// Raw risk signals the advice was derived from
    pub risk: RiskFactors,

    pub similar_items: Vec<SimilarItem>,

    pub alternatives: Vec<AlternativeOption>,

    pub market_analysis: MarketAnalysis,
}

/// User reaction to a piece of advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackDecision {
    Accepted,
    Rejected,
    Ignored,
}

/// What the feedback was about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackContext {
    pub item_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice_type: Option<AdviceType>,
}

/// A displayable recommendation, keyed by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub kind: SuggestionKind,
}

/// Strongly-typed payload of a `Suggestion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SuggestionKind {
    Category(CategorySuggestion),

    Price {
        price: f64,
        average_price: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<PriceRange>,
    },

    Trend {
        trend: PriceTrend,
        best_time_to_buy: String,
    },

    PurchaseAdvice(PurchaseAdvice),

    DuplicateWarning {
        item_ids: Vec<String>,
        similar: Vec<SimilarItem>,
    },
}

impl SuggestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Category(_) => "category",
            Self::Price { .. } => "price",
            Self::Trend { .. } => "trend",
            Self::PurchaseAdvice(_) => "purchase_advice",
            Self::DuplicateWarning { .. } => "duplicate_warning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_item_deserializes_with_missing_fields() {
        let json = r#"{"id":"i1","name":"台灯","category_id":"c3","extra":"ignored"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item, Item::new("i1", "台灯", "c3"));
        assert_eq!(item.primary_image(), "");
    }

    #[test]
    fn test_parse_day_formats() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_day("2024-03-09"), Some(day));
        assert_eq!(parse_day("2024-03-09T23:10:00+08:00"), Some(day));
        assert_eq!(parse_day("2024-03-09T08:00:00.123"), Some(day));
        assert_eq!(parse_day("yesterday"), None);

        let item = Item::new("i1", "台灯", "c3").with_purchase_date("2024-03-09");
        assert_eq!(item.purchase_day(), Some(day));
    }

    #[test]
    fn test_condition_wire_names() {
        let parsed: ItemCondition = serde_json::from_str("\"like_new\"").unwrap();
        assert_eq!(parsed, ItemCondition::LikeNew);
        assert_eq!(parsed.as_str(), "like_new");
    }

    #[test]
    fn test_advice_type_serializes_as_type_field() {
        let advice = PurchaseAdvice {
            advice_type: AdviceType::Wait,
            confidence: 0.6,
            reasons: vec![],
            risk: RiskFactors::default(),
            similar_items: vec![],
            alternatives: vec![],
            market_analysis: MarketAnalysis {
                average_price: 100.0,
                price_trend: PriceTrend::Stable,
                best_time_to_buy: String::new(),
            },
        };
        let json = serde_json::to_value(&advice).unwrap();
        assert_eq!(json["type"], "wait");
        assert_eq!(json["market_analysis"]["price_trend"], "stable");
    }

    #[test]
    fn test_price_range_bounded() {
        let range = PriceRange::bounded(5.5, 8.8, 10.0);
        assert_eq!(range.min, 10.0);
        assert_eq!(range.max, 10.0);

        let range = PriceRange::bounded(100.0, 160.0, 10.0);
        assert_eq!(range, PriceRange { min: 100.0, max: 160.0 });
    }

    #[test]
    fn test_risk_total_is_mean() {
        let risk = RiskFactors {
            duplicate: 1.0,
            budget: 0.8,
            impulse: 0.4,
            category_overuse: 0.0,
        };
        assert!((risk.total() - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_suggestion_kind_tagging() {
        let kind = SuggestionKind::Trend {
            trend: PriceTrend::Up,
            best_time_to_buy: "later".into(),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "trend");
        assert_eq!(json["data"]["trend"], "up");
        assert_eq!(kind.label(), "trend");
    }
}
