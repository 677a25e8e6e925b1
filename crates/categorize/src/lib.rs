//! Category suggestion for new items.
//!
//! Scores every known category against an item's name and description
//! with a pluggable `CategoryStrategy`, ranks them, and assembles a
//! `CategorySuggestion` with rendered reasons and up to three alternatives.
//! When nothing scores, a low-confidence fallback is returned instead of
//! an error.

mod config;
mod strategy;

pub use config::{CategoryConfig, CategoryWeights, ConfigError, HitMapping, ScoringMode};
pub use strategy::{
    CategoryScore, CategoryStrategy, KeywordHitStrategy, ScoringInput, WeightedStrategy,
};

use stashwise_explain::explain_category_reason;
use stashwise_features::extract_keywords;
use stashwise_model::{
    AlternativeCategory, Category, CategoryReason, CategoryRequest, CategorySuggestion, Item,
    FALLBACK_CATEGORY_ID, FALLBACK_CATEGORY_NAME,
};
use stashwise_taxonomy::KeywordTaxonomy;

/// A category with its score, in ranked order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCategory {
    pub category: Category,
    pub score: f64,
    pub reasons: Vec<CategoryReason>,
}

/// Suggests categories for items.
///
/// Holds the category list and the user's item history for one session;
/// mutating calls take `&mut self`, so a shared instance needs an outer
/// lock.
#[derive(Debug)]
pub struct CategorySuggester {
    config: CategoryConfig,
    taxonomy: KeywordTaxonomy,
    strategy: Box<dyn CategoryStrategy>,
    categories: Vec<Category>,
    history: Vec<Item>,
}

impl CategorySuggester {
    /// Create a suggester using the built-in taxonomy and the strategy
    /// named by `config.mode`.
    pub fn new(config: CategoryConfig) -> Self {
        Self::with_taxonomy(config, KeywordTaxonomy::builtin())
    }

    pub fn with_taxonomy(config: CategoryConfig, taxonomy: KeywordTaxonomy) -> Self {
        let strategy: Box<dyn CategoryStrategy> = match config.mode {
            ScoringMode::Weighted => Box::new(WeightedStrategy::new(config.clone())),
            ScoringMode::KeywordHits => Box::new(KeywordHitStrategy::new(&config)),
        };
        Self::with_strategy(config, taxonomy, strategy)
    }

    /// Create a suggester with a caller-supplied strategy.
    pub fn with_strategy(
        config: CategoryConfig,
        taxonomy: KeywordTaxonomy,
        strategy: Box<dyn CategoryStrategy>,
    ) -> Self {
        Self {
            config,
            taxonomy,
            strategy,
            categories: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    pub fn set_item_history(&mut self, items: Vec<Item>) {
        self.history = items;
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Score and rank every category, best first.
    ///
    /// Ties keep the order of the category list.
    pub fn rank(&self, request: &CategoryRequest) -> Vec<RankedCategory> {
        let description = request.description_text();
        let mut keywords = extract_keywords(request.name.as_str());
        keywords.extend(extract_keywords(description));

        let input = ScoringInput {
            name: &request.name,
            description,
            keywords: &keywords,
            history: &self.history,
        };

        let mut ranked: Vec<RankedCategory> = self
            .categories
            .iter()
            .map(|category| {
                let scored = self.strategy.score(&input, category, &self.taxonomy);
                RankedCategory {
                    category: category.clone(),
                    score: scored.score,
                    reasons: scored.reasons,
                }
            })
            .collect();

        // Sort by score descending; stable, so ties keep list order
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        ranked
    }

    /// Suggest a category for an item.
    pub fn suggest_category(&self, request: &CategoryRequest) -> CategorySuggestion {
        let ranked = self.rank(request);

        let Some(best) = ranked.first().filter(|r| r.score > 0.0) else {
            tracing::debug!(
                name = %request.name,
                categories = self.categories.len(),
                "No category scored, using fallback"
            );
            return self.fallback();
        };

        let alternatives: Vec<AlternativeCategory> = ranked
            .iter()
            .skip(1)
            .take(self.config.max_alternatives)
            .filter(|r| r.score > 0.0 && !r.category.id.is_empty())
            .map(|r| AlternativeCategory {
                category_id: r.category.id.clone(),
                category_name: r.category.name.clone(),
                confidence: self
                    .strategy
                    .alternative_confidence(r.score)
                    .min(self.config.max_alternative_confidence)
                    .max(0.0),
            })
            .filter(|alt| alt.confidence > 0.0)
            .collect();

        let confidence = self
            .strategy
            .winner_confidence(best.score)
            .min(self.config.max_confidence)
            .max(0.0);

        tracing::debug!(
            name = %request.name,
            strategy = self.strategy.name(),
            category = %best.category.name,
            score = best.score,
            confidence,
            alternatives = alternatives.len(),
            "Category suggested"
        );

        CategorySuggestion {
            category_id: best.category.id.clone(),
            category_name: best.category.name.clone(),
            confidence,
            reasons: best
                .reasons
                .iter()
                .take(self.config.max_reasons)
                .map(explain_category_reason)
                .collect(),
            alternatives,
        }
    }

    /// Record which category the user actually chose.
    ///
    /// Category feedback is only logged; it does not change scoring.
    pub fn record_feedback(&self, item_id: &str, suggested: &str, chosen: &str) {
        tracing::info!(
            item_id,
            suggested,
            chosen,
            accepted = suggested == chosen,
            "Category feedback"
        );
    }

    fn fallback(&self) -> CategorySuggestion {
        let (category_id, category_name) = match self.categories.first() {
            Some(category) => (category.id.clone(), category.name.clone()),
            None => (
                FALLBACK_CATEGORY_ID.to_string(),
                FALLBACK_CATEGORY_NAME.to_string(),
            ),
        };

        CategorySuggestion {
            category_id,
            category_name,
            confidence: self.config.fallback_confidence,
            reasons: vec![explain_category_reason(&CategoryReason::Fallback)],
            alternatives: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stashwise_taxonomy::TaxonomyEntry;

    fn categories() -> Vec<Category> {
        vec![
            Category::new("c1", "电子产品"),
            Category::new("c2", "服装配饰"),
            Category::new("c3", "生活用品"),
        ]
    }

    fn suggester(mode: ScoringMode, categories: Vec<Category>) -> CategorySuggester {
        let mut suggester = CategorySuggester::new(CategoryConfig::default().with_mode(mode));
        suggester.set_categories(categories);
        suggester
    }

    #[test]
    fn test_phone_goes_to_electronics() {
        let suggester = suggester(ScoringMode::Weighted, vec![Category::new("c1", "电子产品")]);
        let suggestion = suggester.suggest_category(&CategoryRequest::new("iPhone 15 手机"));
        assert_eq!(suggestion.category_id, "c1");
        assert!(suggestion.confidence > 0.3);
        assert_eq!(suggestion.reasons, vec!["关键词匹配: 100%".to_string()]);
    }

    #[test]
    fn test_negative_confidence_caps_do_not_panic() {
        let config = CategoryConfig {
            max_confidence: -0.5,
            max_alternative_confidence: -0.5,
            ..Default::default()
        };
        let mut suggester = CategorySuggester::new(config);
        suggester.set_categories(categories());

        let request = CategoryRequest::new("华为 智能手表").with_description("运动 手环");
        let suggestion = suggester.suggest_category(&request);
        assert_eq!(suggestion.category_id, "c1");
        assert_eq!(suggestion.confidence, 0.0);
        assert!(suggestion.alternatives.is_empty());
    }

    #[test]
    fn test_empty_category_list_falls_back() {
        for mode in [ScoringMode::Weighted, ScoringMode::KeywordHits] {
            let suggester = suggester(mode, Vec::new());
            let suggestion = suggester.suggest_category(&CategoryRequest::new("iPhone 15 手机"));
            assert_eq!(suggestion.category_id, FALLBACK_CATEGORY_ID);
            assert_eq!(suggestion.category_name, FALLBACK_CATEGORY_NAME);
            assert_eq!(suggestion.confidence, 0.3);
            assert_eq!(suggestion.reasons, vec!["基于通用分类规则".to_string()]);
            assert!(suggestion.alternatives.is_empty());
            assert!(suggestion.is_fallback());
        }
    }

    #[test]
    fn test_no_positive_score_uses_first_category() {
        let suggester = suggester(ScoringMode::Weighted, categories());
        let suggestion = suggester.suggest_category(&CategoryRequest::new("12345"));
        assert_eq!(suggestion.category_id, "c1");
        assert_eq!(suggestion.confidence, 0.3);
        assert!(!suggestion.is_fallback());
    }

    #[test]
    fn test_weighted_ranking_with_alternatives() {
        let suggester = suggester(ScoringMode::Weighted, categories());
        let request = CategoryRequest::new("华为 智能手表").with_description("运动 手环");
        let suggestion = suggester.suggest_category(&request);

        assert_eq!(suggestion.category_id, "c1");
        assert!((suggestion.confidence - 0.3).abs() < 1e-9);
        assert_eq!(suggestion.alternatives.len(), 1);
        assert_eq!(suggestion.alternatives[0].category_id, "c2");
        assert!((suggestion.alternatives[0].confidence - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_history_preference_breaks_silence() {
        let mut suggester = suggester(
            ScoringMode::Weighted,
            vec![Category::new("c1", "电子产品"), Category::new("c2", "食品饮料")],
        );
        suggester.set_item_history(vec![Item::new("i1", "绿茶", "c2"), Item::new("i2", "可乐", "c2")]);

        let suggestion = suggester.suggest_category(&CategoryRequest::new("台灯"));
        assert_eq!(suggestion.category_id, "c2");
        assert!((suggestion.confidence - 0.1).abs() < 1e-9);
        assert_eq!(suggestion.reasons, vec!["历史偏好: 100%".to_string()]);
    }

    #[test]
    fn test_name_similarity_contributes() {
        let suggester = suggester(ScoringMode::Weighted, vec![Category::new("c1", "Books")]);
        let suggestion = suggester.suggest_category(&CategoryRequest::new("Books and notes"));
        assert_eq!(suggestion.category_id, "c1");
        assert!((suggestion.confidence - 0.1).abs() < 1e-9);
        assert_eq!(suggestion.reasons, vec!["名称相似度: 33%".to_string()]);
    }

    #[test]
    fn test_confidence_clamped() {
        let taxonomy = KeywordTaxonomy::from_entries(vec![TaxonomyEntry {
            category: "手机".into(),
            keywords: vec!["手机".into()],
        }])
        .unwrap();
        let mut suggester = CategorySuggester::with_taxonomy(CategoryConfig::default(), taxonomy);
        suggester.set_categories(vec![Category::new("c1", "手机")]);
        suggester.set_item_history(vec![Item::new("i1", "旧手机", "c1")]);

        let request = CategoryRequest::new("手机").with_description("手机");
        let ranked = suggester.rank(&request);
        assert!((ranked[0].score - 1.0).abs() < 1e-9);

        let suggestion = suggester.suggest_category(&request);
        assert_eq!(suggestion.confidence, 0.95);
        assert_eq!(suggestion.reasons.len(), 3);
    }

    #[test]
    fn test_confidence_bounds_hold() {
        let requests = [
            CategoryRequest::new("iPhone 15 手机").with_description("华为 小米 充电器 耳机"),
            CategoryRequest::new("耐克 运动鞋").with_description("跑步 运动 健身"),
            CategoryRequest::new(""),
            CategoryRequest::new("宜家 沙发 椅子 桌子"),
        ];
        for mode in [ScoringMode::Weighted, ScoringMode::KeywordHits] {
            let suggester = suggester(mode, categories());
            for request in &requests {
                let suggestion = suggester.suggest_category(request);
                assert!((0.0..=0.95).contains(&suggestion.confidence));
                assert!(suggestion.alternatives.len() <= 3);
                assert!(suggestion.reasons.len() <= 3);
                for alt in &suggestion.alternatives {
                    assert!((0.0..=0.9).contains(&alt.confidence));
                }
            }
        }
    }

    #[test]
    fn test_keyword_hits_mode() {
        let suggester = suggester(ScoringMode::KeywordHits, categories());
        assert_eq!(suggester.strategy_name(), "keyword_hits");

        let request = CategoryRequest::new("华为 智能手表").with_description("运动 手环");
        let suggestion = suggester.suggest_category(&request);

        assert_eq!(suggestion.category_id, "c1");
        assert!((suggestion.confidence - 0.9).abs() < 1e-9);
        assert_eq!(
            suggestion.reasons,
            vec![
                "匹配到 3 个关键词".to_string(),
                "基于物品名称和描述分析".to_string(),
                "符合电子产品分类特征".to_string(),
            ]
        );
        assert_eq!(suggestion.alternatives.len(), 1);
        assert_eq!(suggestion.alternatives[0].category_id, "c2");
        assert!((suggestion.alternatives[0].confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_category_order() {
        let taxonomy = KeywordTaxonomy::from_entries(vec![
            TaxonomyEntry {
                category: "早餐".into(),
                keywords: vec!["咖啡".into()],
            },
            TaxonomyEntry {
                category: "饮品".into(),
                keywords: vec!["咖啡".into()],
            },
        ])
        .unwrap();
        let mut suggester = CategorySuggester::with_taxonomy(CategoryConfig::default(), taxonomy);
        suggester.set_categories(vec![Category::new("b", "饮品"), Category::new("a", "早餐")]);

        let suggestion = suggester.suggest_category(&CategoryRequest::new("咖啡"));
        assert_eq!(suggestion.category_id, "b");
        assert_eq!(suggestion.alternatives[0].category_id, "a");
    }

    #[test]
    fn test_alternative_without_id_dropped() {
        let mut suggester = CategorySuggester::new(CategoryConfig::default());
        suggester.set_categories(vec![Category::new("c1", "电子产品"), Category::new("", "服装配饰")]);

        let request = CategoryRequest::new("华为 智能手表");
        let suggestion = suggester.suggest_category(&request);
        assert_eq!(suggestion.category_id, "c1");
        assert!(suggestion.alternatives.is_empty());
    }
}
