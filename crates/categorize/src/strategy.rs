//! Per-category scoring strategies.
//!
//! A strategy scores one category at a time and never looks at another
//! category's result, so the suggester is free to rank however it likes.

use crate::config::{CategoryConfig, HitMapping};
use stashwise_features::calculate_similarity;
use stashwise_model::{Category, CategoryReason, Item};
use stashwise_taxonomy::KeywordTaxonomy;
use std::fmt::Debug;

/// Everything a strategy may look at for one request.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub name: &'a str,
    /// Empty when absent
    pub description: &'a str,
    /// Name keywords followed by description keywords
    pub keywords: &'a [String],
    pub history: &'a [Item],
}

/// Score of one category plus the reasons that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScore {
    pub score: f64,
    pub reasons: Vec<CategoryReason>,
}

/// Trait for category scoring strategies.
pub trait CategoryStrategy: Debug + Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Score a single category. Scores are only compared with each other.
    fn score(
        &self,
        input: &ScoringInput<'_>,
        category: &Category,
        taxonomy: &KeywordTaxonomy,
    ) -> CategoryScore;

    /// Map the winning score to a confidence.
    fn winner_confidence(&self, score: f64) -> f64;

    /// Map a runner-up score to a confidence.
    fn alternative_confidence(&self, score: f64) -> f64;
}

/// Weighted blend of keyword overlap, name and description similarity, and
/// history share.
#[derive(Debug, Clone)]
pub struct WeightedStrategy {
    config: CategoryConfig,
}

impl WeightedStrategy {
    pub fn new(config: CategoryConfig) -> Self {
        Self { config }
    }

    /// Fraction of keywords that match any of the category's taxonomy words.
    fn keyword_score(keywords: &[String], category: &str, taxonomy: &KeywordTaxonomy) -> f64 {
        if keywords.is_empty() || taxonomy.keywords(category).is_empty() {
            return 0.0;
        }
        let matched = keywords
            .iter()
            .filter(|keyword| taxonomy.token_matches(category, keyword))
            .count();
        matched as f64 / keywords.len() as f64
    }

    /// Share of the history already filed under the category.
    fn history_score(history: &[Item], category_id: &str) -> f64 {
        if history.is_empty() {
            return 0.0;
        }
        let in_category = history.iter().filter(|i| i.category_id == category_id).count();
        in_category as f64 / history.len() as f64
    }
}

impl CategoryStrategy for WeightedStrategy {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn score(
        &self,
        input: &ScoringInput<'_>,
        category: &Category,
        taxonomy: &KeywordTaxonomy,
    ) -> CategoryScore {
        let weights = &self.config.weights;
        let mut score = 0.0;
        let mut reasons = Vec::new();

        let keyword = Self::keyword_score(input.keywords, &category.name, taxonomy);
        if keyword > 0.0 {
            score += keyword * weights.keyword;
            reasons.push(CategoryReason::KeywordMatch { ratio: keyword });
        }

        let name = calculate_similarity(input.name, &category.name);
        if name > self.config.name_threshold {
            score += name * weights.name;
            reasons.push(CategoryReason::NameSimilarity { similarity: name });
        }

        if !input.description.trim().is_empty() {
            let description = calculate_similarity(input.description, &category.name);
            if description > self.config.description_threshold {
                score += description * weights.description;
                reasons.push(CategoryReason::DescriptionRelevance {
                    similarity: description,
                });
            }
        }

        let history = Self::history_score(input.history, &category.id);
        if history > 0.0 {
            score += history * weights.history;
            reasons.push(CategoryReason::HistoryPreference { share: history });
        }

        CategoryScore { score, reasons }
    }

    fn winner_confidence(&self, score: f64) -> f64 {
        score
    }

    fn alternative_confidence(&self, score: f64) -> f64 {
        score
    }
}

/// Count of taxonomy keywords contained in `name + description`.
#[derive(Debug, Clone)]
pub struct KeywordHitStrategy {
    winner: HitMapping,
    alternative: HitMapping,
}

impl KeywordHitStrategy {
    pub fn new(config: &CategoryConfig) -> Self {
        Self {
            winner: config.winner_hits.clone(),
            alternative: config.alternative_hits.clone(),
        }
    }
}

impl CategoryStrategy for KeywordHitStrategy {
    fn name(&self) -> &'static str {
        "keyword_hits"
    }

    fn score(
        &self,
        input: &ScoringInput<'_>,
        category: &Category,
        taxonomy: &KeywordTaxonomy,
    ) -> CategoryScore {
        let text = format!("{} {}", input.name, input.description);
        let hits = taxonomy.hits_in(&category.name, &text);
        if hits == 0 {
            return CategoryScore {
                score: 0.0,
                reasons: Vec::new(),
            };
        }

        CategoryScore {
            score: hits as f64,
            reasons: vec![
                CategoryReason::KeywordHits { hits },
                CategoryReason::TextAnalysis,
                CategoryReason::CategoryTraits {
                    category: category.name.clone(),
                },
            ],
        }
    }

    fn winner_confidence(&self, score: f64) -> f64 {
        self.winner.confidence(score)
    }

    fn alternative_confidence(&self, score: f64) -> f64 {
        self.alternative.confidence(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(name: &'a str, keywords: &'a [String], history: &'a [Item]) -> ScoringInput<'a> {
        ScoringInput {
            name,
            description: "",
            keywords,
            history,
        }
    }

    #[test]
    fn test_weighted_keyword_ratio() {
        let strategy = WeightedStrategy::new(CategoryConfig::default());
        let taxonomy = KeywordTaxonomy::builtin();
        let keywords = vec!["iPhone".to_string(), "保护壳".to_string()];
        let scored = strategy.score(
            &input("iPhone 保护壳", &keywords, &[]),
            &Category::new("c1", "电子产品"),
            &taxonomy,
        );
        assert!((scored.score - 0.2).abs() < 1e-9);
        assert_eq!(scored.reasons, vec![CategoryReason::KeywordMatch { ratio: 0.5 }]);
    }

    #[test]
    fn test_weighted_unknown_category_scores_zero() {
        let strategy = WeightedStrategy::new(CategoryConfig::default());
        let taxonomy = KeywordTaxonomy::builtin();
        let keywords = vec!["猫粮".to_string()];
        let scored = strategy.score(
            &input("猫粮", &keywords, &[]),
            &Category::new("c9", "宠物用品"),
            &taxonomy,
        );
        assert_eq!(scored.score, 0.0);
        assert!(scored.reasons.is_empty());
    }

    #[test]
    fn test_weighted_history_share() {
        let strategy = WeightedStrategy::new(CategoryConfig::default());
        let taxonomy = KeywordTaxonomy::builtin();
        let history = vec![
            Item::new("i1", "a", "c2"),
            Item::new("i2", "b", "c2"),
            Item::new("i3", "c", "c1"),
            Item::new("i4", "d", "c2"),
        ];
        let scored = strategy.score(
            &input("台灯", &[], &history),
            &Category::new("c2", "生活用品"),
            &taxonomy,
        );
        assert!((scored.score - 0.075).abs() < 1e-9);
        assert_eq!(
            scored.reasons,
            vec![CategoryReason::HistoryPreference { share: 0.75 }]
        );
    }

    #[test]
    fn test_keyword_hits_counts_brand_terms() {
        let strategy = KeywordHitStrategy::new(&CategoryConfig::default());
        let taxonomy = KeywordTaxonomy::builtin();
        let scored = strategy.score(
            &ScoringInput {
                name: "星巴克 咖啡豆",
                description: "深度烘焙",
                keywords: &[],
                history: &[],
            },
            &Category::new("c5", "食品饮料"),
            &taxonomy,
        );
        assert_eq!(scored.score, 2.0);
        assert_eq!(scored.reasons.len(), 3);
        assert!((strategy.winner_confidence(scored.score) - 0.8).abs() < 1e-9);
        assert!((strategy.alternative_confidence(scored.score) - 0.6).abs() < 1e-9);
    }
}
