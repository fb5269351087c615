//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section has defaults matching the reference filter policy, so a missing
//! file is not an error. Secrets are referenced by env-var name and resolved
//! at runtime.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::types::ScoutError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub filters: FilterConfig,
    pub http: HttpConfig,
    pub retry: RetryConfig,
    pub marketplace: MarketplaceConfig,
    pub supplier: SupplierConfig,
    pub trends: TrendsConfig,
}

/// Candidate acceptance thresholds.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub max_sell_price: Decimal,
    /// Minimum margin as a fraction (0.30 = 30%).
    pub min_margin: Decimal,
    pub max_listings: u64,
    pub top_n_trends: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_sell_price: dec!(25.0),
            min_margin: dec!(0.30),
            max_listings: 250,
            top_n_trends: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "TRENDSCOUT/0.1.0".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry policy for marketplace and supplier calls.
/// `max_retries = 0` means every call is attempted exactly once.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff_base_secs: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketplaceConfig {
    pub endpoint: String,
    pub page_size: u32,
    pub currency: String,
    pub app_id_env: String,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://svcs.ebay.com/services/search/FindingService/v1".to_string(),
            page_size: 100,
            currency: "USD".to_string(),
            app_id_env: "EBAY_APP_ID".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SupplierConfig {
    pub endpoint: String,
    pub page_size: u32,
    pub app_key_env: String,
    pub tracking_id_env: String,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://gw.api.alibaba.com/openapi/param2/2/portals.open/api.listPromotionProduct"
                .to_string(),
            page_size: 20,
            app_key_env: "ALIEXPRESS_APP_KEY".to_string(),
            tracking_id_env: "ALIEXPRESS_TRACKING_ID".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrendsConfig {
    pub daily_url: String,
    pub hot_searches_url: String,
    pub language: String,
    pub tz_offset: i32,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            daily_url: "https://trends.google.com/trends/api/dailytrends".to_string(),
            hot_searches_url: "https://trends.google.com/trends/hottrends/visualize/internal/data"
                .to_string(),
            language: "en-US".to_string(),
            tz_offset: 0,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load configuration if the file exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject threshold combinations that would make the filter meaningless.
    pub fn validate(&self) -> Result<(), ScoutError> {
        let f = &self.filters;
        if f.max_sell_price <= Decimal::ZERO {
            return Err(ScoutError::InvalidConfig(
                "filters.max_sell_price must be positive".into(),
            ));
        }
        if f.min_margin < Decimal::ZERO || f.min_margin >= Decimal::ONE {
            return Err(ScoutError::InvalidConfig(
                "filters.min_margin must be in [0, 1)".into(),
            ));
        }
        if f.top_n_trends == 0 {
            return Err(ScoutError::InvalidConfig(
                "filters.top_n_trends must be at least 1".into(),
            ));
        }
        if self.marketplace.page_size == 0 || self.supplier.page_size == 0 {
            return Err(ScoutError::InvalidConfig("page_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Blank values are treated as unset.
    pub fn resolve_env(env_name: &str) -> Option<String> {
        std::env::var(env_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
