//! Spending aggregates derived from a user's item history.

use chrono::{Datelike, Months, NaiveDate};
use stashwise_model::Item;
use std::collections::BTreeMap;

/// Budget parameters that feedback may rescale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingThresholds {
    pub monthly_budget: f64,
    pub average_item_price: f64,
}

/// Per-category spending aggregates.
///
/// Always rebuilt from scratch when the history changes; only the
/// thresholds survive a rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingProfile {
    pub thresholds: SpendingThresholds,
    /// Summed purchase price per category id
    pub category_spending: BTreeMap<String, f64>,
    /// Purchases per category id within the trailing month
    pub purchase_frequency: BTreeMap<String, usize>,
    /// Items per category id
    pub category_items: BTreeMap<String, usize>,
}

impl SpendingProfile {
    pub fn empty(thresholds: SpendingThresholds) -> Self {
        Self {
            thresholds,
            category_spending: BTreeMap::new(),
            purchase_frequency: BTreeMap::new(),
            category_items: BTreeMap::new(),
        }
    }

    /// Aggregate `items` as of `today`.
    pub fn build(items: &[Item], today: NaiveDate, thresholds: SpendingThresholds) -> Self {
        let window_start = trailing_month_start(today);
        let mut profile = Self::empty(thresholds);

        for item in items {
            *profile
                .category_spending
                .entry(item.category_id.clone())
                .or_default() += item.purchase_price.unwrap_or(0.0);
            *profile
                .category_items
                .entry(item.category_id.clone())
                .or_default() += 1;

            let Some(raw) = item.purchase_date.as_deref() else {
                continue;
            };
            match item.purchase_day() {
                Some(day) if day >= window_start => {
                    *profile
                        .purchase_frequency
                        .entry(item.category_id.clone())
                        .or_default() += 1;
                }
                Some(_) => {}
                None => {
                    tracing::warn!(item_id = %item.id, date = raw, "Unparseable purchase date");
                }
            }
        }

        profile
    }

    /// Spending across all categories.
    pub fn total_spending(&self) -> f64 {
        self.category_spending.values().sum()
    }

    /// Mean spending per category present in the history.
    pub fn mean_category_spending(&self) -> f64 {
        self.total_spending() / self.category_spending.len().max(1) as f64
    }

    pub fn category_spending(&self, category_id: &str) -> f64 {
        self.category_spending.get(category_id).copied().unwrap_or(0.0)
    }

    pub fn recent_purchases(&self, category_id: &str) -> usize {
        self.purchase_frequency.get(category_id).copied().unwrap_or(0)
    }

    /// Mean price of the category's items, if the category has any.
    pub fn category_average_price(&self, category_id: &str) -> Option<f64> {
        let count = self.category_items.get(category_id).copied().unwrap_or(0);
        (count > 0).then(|| self.category_spending(category_id) / count as f64)
    }
}

/// First day of the previous calendar month.
pub fn trailing_month_start(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .and_then(|first| first.checked_sub_months(Months::new(1)))
        .unwrap_or(today)
}
