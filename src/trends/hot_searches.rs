//! Google Trends hot-searches feed (secondary).
//!
//! The endpoint returns a JSON object keyed by country name
//! (`{"australia": ["term", ...], "united_states": [...]}`); the region's
//! country-name code selects the list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use tracing::debug;

use super::TrendFeed;
use crate::config::{HttpConfig, TrendsConfig};
use crate::types::Region;

const FEED_NAME: &str = "trending_searches";

fn parse_hot_searches(body: &str, country_name: &str) -> Result<Vec<String>> {
    let mut by_country: HashMap<String, Vec<String>> =
        serde_json::from_str(body).context("Failed to parse trending searches response")?;
    by_country
        .remove(country_name)
        .with_context(|| format!("No trending searches listed for {country_name}"))
}

pub struct HotSearchesFeed {
    http: Client,
    cfg: TrendsConfig,
}

impl HotSearchesFeed {
    pub fn new(cfg: TrendsConfig, http_cfg: &HttpConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(http_cfg.timeout())
            .user_agent(http_cfg.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client for trending searches")?;
        Ok(Self { http, cfg })
    }
}

#[async_trait]
impl TrendFeed for HotSearchesFeed {
    fn name(&self) -> &'static str {
        FEED_NAME
    }

    async fn fetch(&self, region: Region) -> Result<Vec<String>> {
        debug!(
            url = %self.cfg.hot_searches_url,
            country = region.trend_country_name(),
            "Fetching trending searches"
        );

        let resp = self
            .http
            .get(&self.cfg.hot_searches_url)
            .send()
            .await
            .context("Trending searches request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Trending searches error {status}: {body}");
        }

        let body = resp
            .text()
            .await
            .context("Failed to read trending searches response")?;
        parse_hot_searches(&body, region.trend_country_name())
    }
}
