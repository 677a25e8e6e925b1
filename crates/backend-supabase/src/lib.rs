//! Record store backends.
//!
//! Provides the `RecordStore` trait and two implementations:
//! - `SupabaseStore`: reads `categories` and `items` over PostgREST
//! - `FixtureStore`: serves a JSON snapshot from memory
//!
//! The recommenders never talk to a store directly; callers fetch
//! snapshots here and hand them over.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stashwise_model::{Category, Item};
use stashwise_query::{filter_items, ItemFilter, PostgrestDialect, QueryDialect, QueryError};
use std::future::Future;
use std::path::Path;
use thiserror::Error;

/// Errors from record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Client setup failed: {0}")]
    Client(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid filter: {0}")]
    Query(#[from] QueryError),

    #[error("Fixture unreadable: {0}")]
    Fixture(#[from] std::io::Error),

    #[error("Store not available")]
    Unavailable,
}

/// Trait for record stores (Supabase, fixtures, ...)
pub trait RecordStore {
    /// All categories, ordered by name.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, StoreError>> + Send;

    /// Every item owned by `user_id`, newest first.
    fn list_user_items(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Item>, StoreError>> + Send;

    /// Items owned by `user_id` matching `filter`.
    fn search_items(
        &self,
        user_id: &str,
        filter: &ItemFilter,
    ) -> impl Future<Output = Result<Vec<Item>, StoreError>> + Send;

    /// Check if the store is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Get the store name for logging.
    fn name(&self) -> &'static str;
}

/// Supabase connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    /// Project URL, without the `/rest/v1` suffix
    pub base_url: String,
    /// Anon or service key, sent as `apikey` and bearer token
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Supabase (PostgREST) store.
pub struct SupabaseStore {
    config: SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn rest_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            table
        )
    }

    fn category_params() -> Vec<(String, String)> {
        vec![
            ("select".to_string(), "*".to_string()),
            ("order".to_string(), "name.asc".to_string()),
        ]
    }

    fn item_params(user_id: &str, filter: &ItemFilter) -> Result<Vec<(String, String)>, StoreError> {
        Ok(PostgrestDialect.translate(user_id, filter)?)
    }

    fn request(&self, url: String) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(String, String)],
    ) -> Result<Vec<T>, StoreError> {
        let url = self.rest_url(table);

        tracing::debug!(url = %url, ?params, "Querying Supabase");

        let response = self
            .request(url)
            .query(params)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::ParseError(e.to_string()))
    }
}

impl RecordStore for SupabaseStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.fetch("categories", &Self::category_params()).await
    }

    async fn list_user_items(&self, user_id: &str) -> Result<Vec<Item>, StoreError> {
        self.search_items(user_id, &ItemFilter::default()).await
    }

    async fn search_items(
        &self,
        user_id: &str,
        filter: &ItemFilter,
    ) -> Result<Vec<Item>, StoreError> {
        let params = Self::item_params(user_id, filter)?;
        let items: Vec<Item> = self.fetch("items", &params).await?;
        tracing::debug!(user_id, count = items.len(), "Fetched items");
        Ok(items)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let response = self
            .request(self.rest_url(""))
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}

/// Snapshot of both tables, as stored in a fixture file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// In-memory store over a fixture snapshot.
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    fixture: Fixture,
}

impl FixtureStore {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture }
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let fixture = serde_json::from_str(json).map_err(|e| StoreError::ParseError(e.to_string()))?;
        Ok(Self::new(fixture))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn owned_by<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.fixture.items.iter().filter(move |item| item.user_id == user_id)
    }
}

impl RecordStore for FixtureStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories = self.fixture.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn list_user_items(&self, user_id: &str) -> Result<Vec<Item>, StoreError> {
        self.search_items(user_id, &ItemFilter::default()).await
    }

    async fn search_items(
        &self,
        user_id: &str,
        filter: &ItemFilter,
    ) -> Result<Vec<Item>, StoreError> {
        if user_id.trim().is_empty() {
            return Err(QueryError::MissingUser.into());
        }
        let owned: Vec<Item> = self.owned_by(user_id).cloned().collect();
        Ok(filter_items(&owned, filter)?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
