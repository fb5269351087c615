//! In-memory fakes for integration testing.
//!
//! Deterministic implementations of every service trait. Responses and
//! failures are fully controllable from test code, and every call is
//! recorded so tests can assert on what the pipeline asked for.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use trendscout::marketplace::MarketplaceQuoteService;
use trendscout::supplier::SourceCostService;
use trendscout::trends::TrendFeed;
use trendscout::types::{CostQuote, Figure, MarketplaceStats, Region};

// ---------------------------------------------------------------------------
// Trend feed
// ---------------------------------------------------------------------------

/// A trend feed with per-region canned terms. Regions without terms fail.
#[derive(Clone)]
pub struct FakeTrendFeed {
    name: &'static str,
    terms: HashMap<Region, Vec<String>>,
    calls: Arc<Mutex<Vec<Region>>>,
}

impl FakeTrendFeed {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            terms: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_terms(mut self, region: Region, terms: &[&str]) -> Self {
        self.terms
            .insert(region, terms.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Regions this feed was asked for, in call order.
    pub fn calls(&self) -> Vec<Region> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrendFeed for FakeTrendFeed {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, region: Region) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(region);
        self.terms
            .get(&region)
            .cloned()
            .ok_or_else(|| anyhow!("{} unavailable for {region}", self.name))
    }
}

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

/// Marketplace fake keyed by keyword. Unknown keywords return no listings;
/// keywords marked as failing return an error.
#[derive(Clone, Default)]
pub struct FakeMarketplace {
    quotes: HashMap<String, MarketplaceStats>,
    failing: Vec<String>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quote(mut self, keyword: &str, listings: u64, average: Decimal) -> Self {
        self.quotes.insert(
            keyword.to_string(),
            MarketplaceStats {
                listing_count: listings,
                average_price: Some(average),
            },
        );
        self
    }

    pub fn failing(mut self, keyword: &str) -> Self {
        self.failing.push(keyword.to_string());
        self
    }

    /// (keyword, site id) pairs requested so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketplaceQuoteService for FakeMarketplace {
    async fn get_stats(&self, keyword: &str, site_id: &str) -> Result<MarketplaceStats> {
        self.calls
            .lock()
            .unwrap()
            .push((keyword.to_string(), site_id.to_string()));
        if self.failing.iter().any(|k| k == keyword) {
            return Err(anyhow!("HTTP 503 from marketplace for {keyword}"));
        }
        Ok(self.quotes.get(keyword).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Supplier
// ---------------------------------------------------------------------------

/// Supplier fake keyed by keyword; anything not configured is `Unknown`.
#[derive(Clone, Default)]
pub struct FakeSupplier {
    costs: HashMap<String, Decimal>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeSupplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cost(mut self, keyword: &str, cost: Decimal) -> Self {
        self.costs.insert(keyword.to_string(), cost);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceCostService for FakeSupplier {
    async fn get_lowest_cost(&self, keyword: &str) -> CostQuote {
        self.calls.lock().unwrap().push(keyword.to_string());
        self.costs
            .get(keyword)
            .copied()
            .map_or(Figure::Unknown, Figure::Known)
    }
}
