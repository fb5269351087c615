//! Retail marketplace integrations.
//!
//! Defines the `MarketplaceQuoteService` trait and the eBay Finding API
//! implementation used to price a keyword on a regional site.

pub mod ebay;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::MarketplaceStats;

/// Selling-price statistics for a keyword on a marketplace site.
///
/// Unlike the other services this one fails loudly: network errors and
/// non-2xx responses are returned as `Err` so the caller can tell "no data"
/// apart from "service down".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceQuoteService: Send + Sync {
    async fn get_stats(&self, keyword: &str, site_id: &str) -> Result<MarketplaceStats>;
}
