//! Trend feeds.
//!
//! Defines the `TrendFeed` trait and the `TrendProvider`, which asks a
//! primary feed for a region's trending searches and falls back to a
//! secondary feed when the primary fails. Feed failures never reach the
//! caller: the worst case is an empty keyword list.

pub mod daily;
pub mod hot_searches;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::types::{FeedOutcome, Region, TrendKeyword};

/// Abstraction over external trending-search sources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrendFeed: Send + Sync {
    /// Feed name for logging.
    fn name(&self) -> &'static str;

    /// Fetch raw trending search terms for a region, most popular first.
    async fn fetch(&self, region: Region) -> Result<Vec<String>>;
}

/// Pick the keyword list to use given the primary outcome and, when the
/// primary failed, the secondary outcome. Both failing yields an empty list.
pub fn select_feed(
    region: Region,
    primary: FeedOutcome<Vec<String>>,
    secondary: Option<FeedOutcome<Vec<String>>>,
) -> Vec<String> {
    match (primary, secondary) {
        (FeedOutcome::Ok(terms), _) => terms,
        (FeedOutcome::Failed(_), Some(FeedOutcome::Ok(terms))) => terms,
        (FeedOutcome::Failed(_), Some(FeedOutcome::Failed(reason))) => {
            warn!(region = %region, error = %reason, "Secondary trend feed failed");
            Vec::new()
        }
        (FeedOutcome::Failed(_), None) => Vec::new(),
    }
}

/// Normalise, de-duplicate (first occurrence wins), and cap at `top_n`.
pub fn dedupe_keywords<I, S>(raw: I, top_n: usize) -> Vec<TrendKeyword>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<TrendKeyword> = Vec::with_capacity(top_n);
    for term in raw {
        if seen.len() >= top_n {
            break;
        }
        if let Some(kw) = TrendKeyword::new(term.as_ref()) {
            if !seen.contains(&kw) {
                seen.push(kw);
            }
        }
    }
    seen
}

/// Trending keywords for a region, with primary → secondary fallback.
pub struct TrendProvider {
    primary: Box<dyn TrendFeed>,
    secondary: Box<dyn TrendFeed>,
}

impl TrendProvider {
    pub fn new(primary: Box<dyn TrendFeed>, secondary: Box<dyn TrendFeed>) -> Self {
        Self { primary, secondary }
    }

    /// Up to `top_n` unique, lower-cased trending keywords for `region`.
    ///
    /// Never fails: the secondary feed is tried once when the primary
    /// fails, and an empty list is returned when both fail.
    pub async fn get_trending_keywords(&self, region: Region, top_n: usize) -> Vec<TrendKeyword> {
        let primary: FeedOutcome<_> = self.primary.fetch(region).await.into();

        let secondary = match &primary {
            FeedOutcome::Ok(_) => None,
            FeedOutcome::Failed(reason) => {
                warn!(
                    region = %region,
                    feed = self.primary.name(),
                    fallback = self.secondary.name(),
                    error = %reason,
                    "Primary trend feed failed, falling back"
                );
                Some(self.secondary.fetch(region).await.into())
            }
        };

        let raw = select_feed(region, primary, secondary);
        debug!(region = %region, raw = raw.len(), "Trend feed returned terms");

        let keywords = dedupe_keywords(raw, top_n);
        info!(region = %region, count = keywords.len(), "Trending keywords ready");
        keywords
    }
}
