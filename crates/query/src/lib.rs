//! Item search filters and their translation.
//!
//! An `ItemFilter` describes a search over a user's items. It can be:
//! - evaluated in memory with `filter_items`
//! - translated into PostgREST query parameters with `PostgrestDialect`

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stashwise_model::{parse_day, Item, ItemCondition};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Missing user id")]
    MissingUser,
    #[error("Invalid price range: {0} > {1}")]
    InvertedPriceRange(f64, f64),
    #[error("Invalid date range: {0} > {1}")]
    InvertedDateRange(NaiveDate, NaiveDate),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Inclusive bounds on `purchase_price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min_price: f64,
    pub max_price: f64,
}

/// Inclusive bounds on `purchase_date` (ISO dates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateBounds {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    PurchaseDate,
    Price,
    #[default]
    CreatedAt,
}

impl SortKey {
    /// Column the key sorts on.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PurchaseDate => "purchase_date",
            Self::Price => "purchase_price",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Search over a user's items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Free text matched against name, description, and tags
    #[serde(default)]
    pub query: Option<String>,

    /// Any-of category filter
    #[serde(default)]
    pub category_ids: Vec<String>,

    #[serde(default)]
    pub condition: Option<ItemCondition>,

    #[serde(default)]
    pub price_range: Option<PriceBounds>,

    #[serde(default)]
    pub date_range: Option<DateBounds>,

    /// All-of tag filter
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub sort_by: SortKey,

    #[serde(default)]
    pub sort_order: SortOrder,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_categories(mut self, category_ids: Vec<String>) -> Self {
        self.category_ids = category_ids;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_condition(mut self, condition: ItemCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_price_range(mut self, min_price: f64, max_price: f64) -> Self {
        self.price_range = Some(PriceBounds {
            min_price,
            max_price,
        });
        self
    }

    pub fn with_date_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.date_range = Some(DateBounds {
            start_date: start.into(),
            end_date: end.into(),
        });
        self
    }

    pub fn sorted_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = key;
        self.sort_order = order;
        self
    }

    /// Trimmed text query, or `None` when blank.
    pub fn text(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Parsed date bounds.
    pub fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, QueryError> {
        let Some(range) = &self.date_range else {
            return Ok(None);
        };
        let start = parse_day(&range.start_date)
            .ok_or_else(|| QueryError::InvalidDate(range.start_date.clone()))?;
        let end = parse_day(&range.end_date)
            .ok_or_else(|| QueryError::InvalidDate(range.end_date.clone()))?;
        if start > end {
            return Err(QueryError::InvertedDateRange(start, end));
        }
        Ok(Some((start, end)))
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if let Some(range) = &self.price_range {
            if range.min_price > range.max_price {
                return Err(QueryError::InvertedPriceRange(
                    range.min_price,
                    range.max_price,
                ));
            }
        }
        self.date_bounds().map(|_| ())
    }
}

/// Evaluate a filter over items, returning matches in the requested order.
pub fn filter_items(items: &[Item], filter: &ItemFilter) -> Result<Vec<Item>, QueryError> {
    filter.validate()?;
    let dates = filter.date_bounds()?;
    let text = filter.text().map(str::to_lowercase);

    let mut matched: Vec<Item> = items
        .iter()
        .filter(|item| text.as_deref().map_or(true, |q| matches_text(item, q)))
        .filter(|item| {
            filter.category_ids.is_empty() || filter.category_ids.contains(&item.category_id)
        })
        .filter(|item| filter.condition.map_or(true, |c| item.condition == Some(c)))
        .filter(|item| {
            filter.price_range.map_or(true, |range| {
                item.purchase_price
                    .is_some_and(|p| p >= range.min_price && p <= range.max_price)
            })
        })
        .filter(|item| {
            dates.map_or(true, |(start, end)| {
                item.purchase_day().is_some_and(|d| d >= start && d <= end)
            })
        })
        .filter(|item| filter.tags.iter().all(|tag| item.tags.contains(tag)))
        .cloned()
        .collect();

    let order = filter.sort_order;
    matched.sort_by(|a, b| match filter.sort_by {
        SortKey::Name => missing_last(Some(&a.name), Some(&b.name), order, |x, y| x.cmp(y)),
        SortKey::PurchaseDate => {
            missing_last(a.purchase_day(), b.purchase_day(), order, |x, y| x.cmp(y))
        }
        SortKey::Price => missing_last(a.purchase_price, b.purchase_price, order, |x, y| {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }),
        SortKey::CreatedAt => missing_last(
            a.created_at.as_deref(),
            b.created_at.as_deref(),
            order,
            |x, y| x.cmp(y),
        ),
    });

    Ok(matched)
}

fn matches_text(item: &Item, query: &str) -> bool {
    item.name.to_lowercase().contains(query)
        || item
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(query))
        || item.tags.iter().any(|t| t.to_lowercase() == query)
}

/// Compare optional keys in `order`, with missing keys always last.
fn missing_last<T>(
    a: Option<T>,
    b: Option<T>,
    order: SortOrder,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => cmp(&a, &b),
            SortOrder::Desc => cmp(&b, &a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Trait for translating filters to backend-specific syntax.
pub trait QueryDialect {
    /// The output type (query parameters, SQL text, ...)
    type Output;

    /// Translate a user's filter to this dialect
    fn translate(&self, user_id: &str, filter: &ItemFilter) -> Result<Self::Output, QueryError>;
}

/// PostgREST query-parameter dialect.
#[derive(Debug, Default)]
pub struct PostgrestDialect;

impl PostgrestDialect {
    /// Strip characters that carry meaning in PostgREST filter syntax.
    fn sanitize(text: &str) -> String {
        text.chars()
            .filter(|c| !matches!(c, ',' | '(' | ')' | '{' | '}' | '*' | '"' | '\\' | ':'))
            .collect()
    }
}

impl QueryDialect for PostgrestDialect {
    type Output = Vec<(String, String)>;

    fn translate(
        &self,
        user_id: &str,
        filter: &ItemFilter,
    ) -> Result<Vec<(String, String)>, QueryError> {
        if user_id.trim().is_empty() {
            return Err(QueryError::MissingUser);
        }
        filter.validate()?;

        let mut params = vec![
            ("select".to_string(), "*".to_string()),
            ("user_id".to_string(), format!("eq.{}", user_id)),
        ];

        if let Some(text) = filter.text() {
            let q = Self::sanitize(text);
            params.push((
                "or".to_string(),
                format!("(name.ilike.*{q}*,description.ilike.*{q}*,tags.cs.{{{q}}})"),
            ));
        }

        if !filter.category_ids.is_empty() {
            let ids: Vec<String> = filter
                .category_ids
                .iter()
                .map(|id| Self::sanitize(id))
                .collect();
            params.push((
                "category_id".to_string(),
                format!("in.({})", ids.join(",")),
            ));
        }

        if let Some((start, end)) = filter.date_bounds()? {
            params.push(("purchase_date".to_string(), format!("gte.{}", start)));
            params.push(("purchase_date".to_string(), format!("lte.{}", end)));
        }

        if let Some(range) = &filter.price_range {
            params.push(("purchase_price".to_string(), format!("gte.{}", range.min_price)));
            params.push(("purchase_price".to_string(), format!("lte.{}", range.max_price)));
        }

        if let Some(condition) = filter.condition {
            params.push(("condition".to_string(), format!("eq.{}", condition.as_str())));
        }

        if !filter.tags.is_empty() {
            let tags: Vec<String> = filter.tags.iter().map(|t| Self::sanitize(t)).collect();
            params.push(("tags".to_string(), format!("cs.{{{}}}", tags.join(","))));
        }

        let direction = match filter.sort_order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        params.push((
            "order".to_string(),
            format!("{}.{}.nullslast", filter.sort_by.column(), direction),
        ));

        Ok(params)
    }
}
