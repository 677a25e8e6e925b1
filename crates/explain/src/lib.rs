//! Explanation generation for recommendations.
//!
//! Converts typed reasons into the user-facing strings carried by
//! `CategorySuggestion` and `PurchaseAdvice`, and turns finished results
//! into `Suggestion` feed entries for display.

use stashwise_model::{
    AdviceReason, AdviceRequest, AlternativeKind, CategoryReason, CategorySuggestion, PriceTrend,
    PurchaseAdvice, Suggestion, SuggestionKind,
};

fn percent(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Render a category reason.
pub fn explain_category_reason(reason: &CategoryReason) -> String {
    match reason {
        CategoryReason::KeywordMatch { ratio } => format!("关键词匹配: {}%", percent(*ratio)),
        CategoryReason::NameSimilarity { similarity } => {
            format!("名称相似度: {}%", percent(*similarity))
        }
        CategoryReason::DescriptionRelevance { similarity } => {
            format!("描述相关度: {}%", percent(*similarity))
        }
        CategoryReason::HistoryPreference { share } => format!("历史偏好: {}%", percent(*share)),
        CategoryReason::KeywordHits { hits } => format!("匹配到 {} 个关键词", hits),
        CategoryReason::TextAnalysis => "基于物品名称和描述分析".to_string(),
        CategoryReason::CategoryTraits { category } => format!("符合{}分类特征", category),
        CategoryReason::Fallback => "基于通用分类规则".to_string(),
    }
}

/// Render a purchase-advice reason.
pub fn explain_advice_reason(reason: &AdviceReason) -> String {
    match reason {
        AdviceReason::Duplicate { similar_count } => {
            format!("检测到{}个相似物品，可能存在重复购买", similar_count)
        }
        AdviceReason::Budget => "此物品价格超出您的平均消费水平，可能影响预算".to_string(),
        AdviceReason::Impulse { category } => {
            format!("您近期在\"{}\"分类下购买频繁，建议冷静思考", category)
        }
        AdviceReason::CategoryOveruse => "该分类消费已超出您的平均水平，建议平衡消费结构".to_string(),
        AdviceReason::Reasonable => "基于您的消费数据分析，此购买决策较为合理".to_string(),
    }
}

/// Display name and rationale for an alternative.
pub fn alternative_text(kind: AlternativeKind) -> (&'static str, &'static str) {
    match kind {
        AlternativeKind::UseExisting => ("使用现有物品", "您已有相似物品，建议先充分利用现有资源"),
        AlternativeKind::CheaperAlternative => {
            ("寻找性价比更高的替代品", "市场上有价格更合理的相似产品")
        }
        AlternativeKind::WaitForPromotion => ("等待促销时机", "关注价格变化，选择合适的购买时机"),
    }
}

/// Advisory text for when to buy, keyed off the price trend.
pub fn best_time_to_buy(trend: PriceTrend) -> &'static str {
    match trend {
        PriceTrend::Up => "等待促销或寻找替代品",
        PriceTrend::Down => "价格低于以往水平，适合入手",
        PriceTrend::Stable => "当前价格较为合理",
    }
}

/// One-line summary of a piece of advice.
pub fn summarize_advice(advice: &PurchaseAdvice) -> String {
    format!(
        "{} ({}%): {}",
        advice.advice_type.label().to_uppercase(),
        percent(advice.confidence),
        advice.reasons.join("; ")
    )
}

/// Feed entry for a category suggestion.
pub fn category_feed(suggestion: &CategorySuggestion) -> Suggestion {
    Suggestion {
        title: "分类建议".to_string(),
        description: format!("建议归类为「{}」", suggestion.category_name),
        confidence: suggestion.confidence,
        kind: SuggestionKind::Category(suggestion.clone()),
    }
}

/// Feed entries for a piece of purchase advice.
///
/// Always yields the advice itself; adds a duplicate warning when similar
/// items drove the duplicate risk, a price entry when a cheaper range was
/// proposed, and a trend entry when the price is off the user's norm.
pub fn advice_feed(advice: &PurchaseAdvice, request: &AdviceRequest) -> Vec<Suggestion> {
    let mut feed = vec![Suggestion {
        title: format!("购买建议: {}", advice.advice_type.label()),
        description: advice.reasons.first().cloned().unwrap_or_default(),
        confidence: advice.confidence,
        kind: SuggestionKind::PurchaseAdvice(advice.clone()),
    }];

    if advice.risk.duplicate > 0.0 && !advice.similar_items.is_empty() {
        feed.push(Suggestion {
            title: "重复购买提醒".to_string(),
            description: format!("已拥有{}个与「{}」相似的物品", advice.similar_items.len(), request.name),
            confidence: advice.risk.duplicate,
            kind: SuggestionKind::DuplicateWarning {
                item_ids: advice.similar_items.iter().map(|s| s.id.clone()).collect(),
                similar: advice.similar_items.clone(),
            },
        });
    }

    if let Some(range) = advice
        .alternatives
        .iter()
        .find(|a| a.kind == AlternativeKind::CheaperAlternative)
        .and_then(|a| a.price_range)
    {
        feed.push(Suggestion {
            title: "价格参考".to_string(),
            description: format!("建议价格区间 {:.0} - {:.0}", range.min, range.max),
            confidence: advice.confidence,
            kind: SuggestionKind::Price {
                price: request.effective_price(),
                average_price: advice.market_analysis.average_price,
                range: Some(range),
            },
        });
    }

    if advice.market_analysis.price_trend != PriceTrend::Stable {
        feed.push(Suggestion {
            title: "价格趋势".to_string(),
            description: advice.market_analysis.best_time_to_buy.clone(),
            confidence: advice.confidence,
            kind: SuggestionKind::Trend {
                trend: advice.market_analysis.price_trend,
                best_time_to_buy: advice.market_analysis.best_time_to_buy.clone(),
            },
        });
    }

    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use stashwise_model::{
        AdviceType, AlternativeOption, MarketAnalysis, PriceRange, RiskFactors, SimilarItem,
    };

    fn advice(trend: PriceTrend) -> PurchaseAdvice {
        PurchaseAdvice {
            advice_type: AdviceType::Wait,
            confidence: 0.6,
            reasons: vec!["检测到2个相似物品，可能存在重复购买".to_string()],
            risk: RiskFactors {
                duplicate: 0.6,
                ..Default::default()
            },
            similar_items: vec![SimilarItem {
                id: "i1".into(),
                name: "索尼 耳机".into(),
                image_url: String::new(),
                similarity_score: 1.0,
            }],
            alternatives: vec![AlternativeOption {
                kind: AlternativeKind::CheaperAlternative,
                name: "寻找性价比更高的替代品".into(),
                reason: String::new(),
                price_range: Some(PriceRange { min: 500.0, max: 800.0 }),
            }],
            market_analysis: MarketAnalysis {
                average_price: 600.0,
                price_trend: trend,
                best_time_to_buy: best_time_to_buy(trend).to_string(),
            },
        }
    }

    #[test]
    fn test_category_reason_percentages() {
        let text = explain_category_reason(&CategoryReason::KeywordMatch { ratio: 0.5 });
        assert_eq!(text, "关键词匹配: 50%");
        let text = explain_category_reason(&CategoryReason::HistoryPreference { share: 1.0 / 3.0 });
        assert_eq!(text, "历史偏好: 33%");
    }

    #[test]
    fn test_advice_reason_duplicate() {
        let text = explain_advice_reason(&AdviceReason::Duplicate { similar_count: 3 });
        assert!(text.contains("重复购买"));
        assert!(text.contains('3'));
    }

    #[test]
    fn test_summarize_advice() {
        let summary = summarize_advice(&advice(PriceTrend::Stable));
        assert!(summary.starts_with("WAIT (60%)"));
    }

    #[test]
    fn test_advice_feed_kinds() {
        let request = AdviceRequest::new("索尼 耳机", "c1").with_price(1000.0);
        let feed = advice_feed(&advice(PriceTrend::Up), &request);
        let kinds: Vec<_> = feed.iter().map(|s| s.kind.label()).collect();
        assert_eq!(kinds, vec!["purchase_advice", "duplicate_warning", "price", "trend"]);
    }

    #[test]
    fn test_advice_feed_stable_trend_omitted() {
        let request = AdviceRequest::new("索尼 耳机", "c1");
        let feed = advice_feed(&advice(PriceTrend::Stable), &request);
        assert!(feed.iter().all(|s| s.kind.label() != "trend"));
    }
}
