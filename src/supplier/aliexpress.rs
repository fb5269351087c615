//! AliExpress affiliate (portals) API integration.
//!
//! API: `https://gw.api.alibaba.com/openapi/param2/2/portals.open/api.listPromotionProduct/{appKey}`
//! Auth: app key in the path, tracking id as a query param. Both are
//! optional: without them every lookup is `Unknown` and no request is made.
//!
//! Prices usually arrive as display text (`"US $3.49"`), so the numeric part
//! is pulled out before conversion. Products are read one at a time from raw
//! JSON: a single malformed entry is skipped without losing the rest.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::SourceCostService;
use crate::config::{AppConfig, HttpConfig, RetryConfig, SupplierConfig};
use crate::retry::{is_retryable_status, with_retry, AttemptError};
use crate::types::{CostQuote, Figure};

/// API cap on `pageSize` for promotion product listings.
const MAX_PAGE_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
struct PromotionResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<PromotionResult>,
}

#[derive(Debug, Deserialize, Default)]
struct PromotionResult {
    #[serde(default)]
    products: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Price parsing
// ---------------------------------------------------------------------------

/// Parse display price text such as `"US $3.49"` or `"$1,299.00"`.
///
/// Takes the first numeric run, drops thousands separators, and rejects
/// anything that does not convert to a positive decimal.
pub fn parse_price_text(text: &str) -> Option<Decimal> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let numeric: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(numeric.trim_end_matches('.'))
        .ok()
        .filter(|p| *p > Decimal::ZERO)
}

/// A price field that carries something: blank strings and nulls do not.
fn present<'a>(product: &'a Value, field: &str) -> Option<&'a Value> {
    match product.get(field)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        v => Some(v),
    }
}

/// Price of one product entry: sale price when present, else original.
fn product_price(product: &Value) -> Option<Decimal> {
    match present(product, "salePrice").or_else(|| present(product, "originalPrice"))? {
        Value::String(text) => parse_price_text(text),
        Value::Number(n) => {
            let raw = n.to_string();
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .ok()
                .filter(|p| *p > Decimal::ZERO)
        }
        _ => None,
    }
}

/// Minimum usable price in a listing response, `Unknown` when none parse.
fn lowest_price(body: PromotionResponse) -> CostQuote {
    if !body.success {
        return Figure::Unknown;
    }
    body.result
        .unwrap_or_default()
        .products
        .iter()
        .filter_map(product_price)
        .min()
        .into()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Supplier credentials: both parts are required for lookups.
pub struct SupplierCredentials {
    pub app_key: SecretString,
    pub tracking_id: String,
}

impl SupplierCredentials {
    /// Read credentials from the env vars named in config.
    pub fn from_env(cfg: &SupplierConfig) -> Option<Self> {
        let app_key = AppConfig::resolve_env(&cfg.app_key_env)?;
        let tracking_id = AppConfig::resolve_env(&cfg.tracking_id_env)?;
        Some(Self {
            app_key: SecretString::new(app_key),
            tracking_id,
        })
    }
}

pub struct AliExpressClient {
    http: Client,
    credentials: Option<SupplierCredentials>,
    cfg: SupplierConfig,
    retry: RetryConfig,
}

impl AliExpressClient {
    pub fn new(
        credentials: Option<SupplierCredentials>,
        cfg: SupplierConfig,
        http_cfg: &HttpConfig,
        retry: RetryConfig,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(http_cfg.timeout())
            .user_agent(http_cfg.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client for AliExpress")?;

        if credentials.is_none() {
            info!("AliExpress credentials not configured; cost data will be reported as n/a");
        }

        Ok(Self {
            http,
            credentials,
            cfg,
            retry,
        })
    }

    fn listing_url(&self, creds: &SupplierCredentials, keyword: &str) -> String {
        format!(
            "{}/{}?fields=productTitle,originalPrice,salePrice&keywords={}\
             &sort=salePrice_asc&pageSize={}&trackingId={}",
            self.cfg.endpoint,
            urlencoding::encode(creds.app_key.expose_secret()),
            urlencoding::encode(keyword),
            self.cfg.page_size.min(MAX_PAGE_SIZE),
            urlencoding::encode(&creds.tracking_id),
        )
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<PromotionResponse, AttemptError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("AliExpress request failed")
            .map_err(AttemptError::Retryable)?;

        let status = resp.status();
        if !status.is_success() {
            let err = anyhow::anyhow!("AliExpress API error {status}");
            return Err(if is_retryable_status(status.as_u16()) {
                AttemptError::Retryable(err)
            } else {
                AttemptError::Fatal(err)
            });
        }

        resp.json::<PromotionResponse>()
            .await
            .context("Failed to parse AliExpress response")
            .map_err(AttemptError::Fatal)
    }
}

#[async_trait]
impl SourceCostService for AliExpressClient {
    async fn get_lowest_cost(&self, keyword: &str) -> CostQuote {
        let Some(creds) = &self.credentials else {
            return Figure::Unknown;
        };

        let url = self.listing_url(creds, keyword);
        match with_retry(&self.retry, "aliexpress", || self.fetch_once(&url)).await {
            Ok(body) => {
                let cost = lowest_price(body);
                debug!(keyword, cost = %cost, "AliExpress lowest price");
                cost
            }
            Err(e) => {
                warn!(keyword, error = %e, "AliExpress lookup failed, cost unknown");
                Figure::Unknown
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
