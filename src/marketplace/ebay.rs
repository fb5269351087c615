//! eBay Finding API integration.
//!
//! API: `https://svcs.ebay.com/services/search/FindingService/v1`
//! Operation: `findItemsAdvanced`, JSON response format.
//! Auth: application id via the `SECURITY-APPNAME` query param.
//!
//! The JSON shape wraps every field in a single-element array, e.g.
//! `findItemsAdvancedResponse[0].searchResult[0].item[*].sellingStatus[0]
//! .currentPrice[0].__value__`. Any missing level
//! reads as an empty item list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use super::MarketplaceQuoteService;
use crate::config::{HttpConfig, MarketplaceConfig, RetryConfig};
use crate::retry::{is_retryable_status, with_retry, AttemptError};
use crate::types::{MarketplaceStats, ScoutError};

/// Finding API hard cap on `entriesPerPage`.
const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// First element of a Finding API array-wrapped field.
fn first<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).and_then(|v| v.as_array()).and_then(|a| a.first())
}

/// Current price of one item, if it carries parseable pricing info.
fn item_price(item: &Value) -> Option<Decimal> {
    let status = first(item, "sellingStatus")?;
    let price = first(status, "currentPrice")?;
    let raw = price.get("__value__")?;
    let parsed = match raw {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    parsed.filter(|p| *p > Decimal::ZERO)
}

/// Extract all current prices from a `findItemsAdvanced` response.
fn extract_prices(body: &Value) -> Vec<Decimal> {
    let items = first(body, "findItemsAdvancedResponse")
        .and_then(|r| first(r, "searchResult"))
        .and_then(|s| s.get("item"))
        .and_then(|i| i.as_array());

    let Some(items) = items else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let price = item_price(item);
            if price.is_none() && item.get("sellingStatus").is_some() {
                debug!("Skipping listing with unparseable current price");
            }
            price
        })
        .collect()
}

/// Parse a response body into marketplace stats.
pub fn parse_stats(body: &Value) -> MarketplaceStats {
    MarketplaceStats::from_prices(&extract_prices(body))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct EbayFindingClient {
    http: Client,
    app_id: SecretString,
    cfg: MarketplaceConfig,
    max_price: Decimal,
    retry: RetryConfig,
}

impl EbayFindingClient {
    /// Create a client bound to one application id and price ceiling.
    pub fn new(
        app_id: SecretString,
        cfg: MarketplaceConfig,
        max_price: Decimal,
        http_cfg: &HttpConfig,
        retry: RetryConfig,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(http_cfg.timeout())
            .user_agent(http_cfg.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client for eBay")?;

        Ok(Self {
            http,
            app_id,
            cfg,
            max_price,
            retry,
        })
    }

    /// Build the `findItemsAdvanced` URL with the price-ceiling filter.
    fn search_url(&self, keyword: &str, site_id: &str) -> String {
        format!(
            "{}?SECURITY-APPNAME={}&OPERATION-NAME=findItemsAdvanced\
             &RESPONSE-DATA-FORMAT=JSON&global-id={}&keywords={}\
             &paginationInput.entriesPerPage={}\
             &itemFilter(0).name=MaxPrice&itemFilter(0).value={}\
             &itemFilter(0).paramName=Currency&itemFilter(0).paramValue={}",
            self.cfg.endpoint,
            urlencoding::encode(self.app_id.expose_secret()),
            urlencoding::encode(site_id),
            urlencoding::encode(keyword),
            self.cfg.page_size.min(MAX_PAGE_SIZE),
            self.max_price.normalize(),
            urlencoding::encode(&self.cfg.currency),
        )
    }

    async fn search_once(&self, url: &str) -> std::result::Result<Value, AttemptError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("eBay Finding API request failed")
            .map_err(AttemptError::Retryable)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = anyhow::Error::new(ScoutError::Marketplace {
                status: status.as_u16(),
                body,
            });
            return Err(if is_retryable_status(status.as_u16()) {
                AttemptError::Retryable(err)
            } else {
                AttemptError::Fatal(err)
            });
        }

        resp.json::<Value>()
            .await
            .context("Failed to parse eBay Finding API response")
            .map_err(AttemptError::Fatal)
    }
}

#[async_trait]
impl MarketplaceQuoteService for EbayFindingClient {
    async fn get_stats(&self, keyword: &str, site_id: &str) -> Result<MarketplaceStats> {
        let url = self.search_url(keyword, site_id);
        debug!(keyword, site_id, "Fetching eBay listings");

        let body = with_retry(&self.retry, "ebay_finding", || self.search_once(&url))
            .await
            .with_context(|| format!("eBay search failed for '{keyword}' on {site_id}"))?;

        let stats = parse_stats(&body);
        debug!(
            keyword,
            site_id,
            listings = stats.listing_count,
            avg_price = ?stats.average_price,
            "eBay stats computed"
        );
        Ok(stats)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
