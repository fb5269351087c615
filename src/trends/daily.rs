//! Google Trends daily-trends feed (primary).
//!
//! API: `https://trends.google.com/trends/api/dailytrends?hl=en-US&tz=0&geo=AU&ns=15`
//! The body is JSON behind an anti-XSSI prefix (`)]}',`), which is stripped
//! before parsing. Queried by locale code (AU, GB, US).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::TrendFeed;
use crate::config::{HttpConfig, TrendsConfig};
use crate::types::Region;

const FEED_NAME: &str = "daily_trends";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
struct DailyTrendsEnvelope {
    #[serde(default)]
    default: DailyTrendsBody,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DailyTrendsBody {
    #[serde(default)]
    trending_searches_days: Vec<TrendingDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendingDay {
    #[serde(default)]
    trending_searches: Vec<TrendingSearch>,
}

#[derive(Debug, Deserialize)]
struct TrendingSearch {
    #[serde(default)]
    title: Option<SearchTitle>,
}

#[derive(Debug, Deserialize)]
struct SearchTitle {
    #[serde(default)]
    query: String,
}

/// Strip the anti-XSSI guard and parse the query titles in feed order.
fn parse_daily_trends(body: &str) -> Result<Vec<String>> {
    let json = match body.find('{') {
        Some(start) => &body[start..],
        None => anyhow::bail!("Daily trends response contained no JSON object"),
    };
    let envelope: DailyTrendsEnvelope =
        serde_json::from_str(json).context("Failed to parse daily trends response")?;

    Ok(envelope
        .default
        .trending_searches_days
        .into_iter()
        .flat_map(|day| day.trending_searches)
        .filter_map(|s| s.title.map(|t| t.query))
        .collect())
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

pub struct DailyTrendsFeed {
    http: Client,
    cfg: TrendsConfig,
}

impl DailyTrendsFeed {
    pub fn new(cfg: TrendsConfig, http_cfg: &HttpConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(http_cfg.timeout())
            .user_agent(http_cfg.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client for daily trends")?;
        Ok(Self { http, cfg })
    }
}

#[async_trait]
impl TrendFeed for DailyTrendsFeed {
    fn name(&self) -> &'static str {
        FEED_NAME
    }

    async fn fetch(&self, region: Region) -> Result<Vec<String>> {
        let url = format!(
            "{}?hl={}&tz={}&geo={}&ns=15",
            self.cfg.daily_url,
            urlencoding::encode(&self.cfg.language),
            self.cfg.tz_offset,
            region.trend_locale(),
        );
        debug!(url = %url, "Fetching daily trends");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Daily trends request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Daily trends error {status}: {body}");
        }

        let body = resp
            .text()
            .await
            .context("Failed to read daily trends response")?;
        parse_daily_trends(&body)
    }
}
