//! TOML settings file.

use anyhow::{Context, Result};
use serde::Deserialize;
use stashwise_advise::{AdviceConfig, FeedbackConfig};
use stashwise_backend_supabase::SupabaseConfig;
use stashwise_categorize::CategoryConfig;
use std::path::Path;

/// Everything a settings file may override. Missing tables and fields keep
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub category: CategoryConfig,
    pub advice: AdviceConfig,
    pub feedback: FeedbackConfig,
    pub store: SupabaseConfig,
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text).context("Invalid settings file")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.category.validate().context("[category]")?;
        self.advice.validate().context("[advice]")?;
        self.feedback.validate().context("[feedback]")?;
        Ok(())
    }
}
