//! Shared types for the TRENDSCOUT pipeline.
//!
//! These types form the data model used across all modules. Trend feeds,
//! marketplace and supplier clients, the evaluator, and the report writer
//! all depend on this module and never on each other's internals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A sales region covered by discovery.
///
/// Each region carries three static mappings: the trend-locale code used by
/// the primary trend feed, the country-name code used by the secondary feed,
/// and the marketplace global-site identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "AU")]
    Au,
    #[serde(rename = "UK")]
    Uk,
    #[serde(rename = "US")]
    Us,
}

impl Region {
    /// Every region, in the fixed order discovery iterates them.
    pub const ALL: [Region; 3] = [Region::Au, Region::Uk, Region::Us];

    /// Short code used in reports and on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Region::Au => "AU",
            Region::Uk => "UK",
            Region::Us => "US",
        }
    }

    /// Locale (geo) code for the primary daily-trends feed.
    pub fn trend_locale(&self) -> &'static str {
        match self {
            Region::Au => "AU",
            Region::Uk => "GB",
            Region::Us => "US",
        }
    }

    /// Country-name code for the secondary hot-searches feed.
    pub fn trend_country_name(&self) -> &'static str {
        match self {
            Region::Au => "australia",
            Region::Uk => "united_kingdom",
            Region::Us => "united_states",
        }
    }

    /// Marketplace global-site identifier.
    pub fn site_id(&self) -> &'static str {
        match self {
            Region::Au => "EBAY-AU",
            Region::Uk => "EBAY-GB",
            Region::Us => "EBAY-US",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AU" => Ok(Region::Au),
            "UK" | "GB" => Ok(Region::Uk),
            "US" => Ok(Region::Us),
            _ => Err(ScoutError::UnknownRegion(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Trend keyword
// ---------------------------------------------------------------------------

/// A lower-cased, non-empty search term produced by a trend feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrendKeyword(String);

impl TrendKeyword {
    /// Normalise raw feed text into a keyword. Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let kw = raw.trim().to_lowercase();
        if kw.is_empty() {
            None
        } else {
            Some(Self(kw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrendKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Service outputs
// ---------------------------------------------------------------------------

/// Aggregate selling-price statistics for one keyword on one marketplace site.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarketplaceStats {
    /// Number of priced listings successfully parsed (not the server total).
    pub listing_count: u64,
    /// Mean current price, absent when no priced listing was parsed.
    pub average_price: Option<Decimal>,
}

impl MarketplaceStats {
    /// Build stats from the prices extracted from one search response.
    pub fn from_prices(prices: &[Decimal]) -> Self {
        let listing_count = prices.len() as u64;
        let average_price = if prices.is_empty() {
            None
        } else {
            let total: Decimal = prices.iter().copied().sum();
            Some(total / Decimal::from(listing_count))
        };
        Self {
            listing_count,
            average_price,
        }
    }
}

/// A value that may be unavailable, rendered as `n/a` at the report boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Figure {
    Known(Decimal),
    Unknown,
}

impl Figure {
    pub fn known(&self) -> Option<Decimal> {
        match self {
            Figure::Known(v) => Some(*v),
            Figure::Unknown => None,
        }
    }
}

impl From<Option<Decimal>> for Figure {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Figure::Unknown, Figure::Known)
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Figure::Known(v) => write!(f, "{v}"),
            Figure::Unknown => f.write_str("n/a"),
        }
    }
}

/// Lowest observed wholesale unit price for a keyword.
pub type CostQuote = Figure;

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A keyword that passed every filter stage and is reportable.
///
/// Only the evaluator constructs candidates; fields are private so a
/// candidate cannot be altered after acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    keyword: TrendKeyword,
    region: Region,
    sell_price: Decimal,
    cost_price: Figure,
    margin_pct: Figure,
    listing_count: u64,
}

impl Candidate {
    pub(crate) fn new(
        keyword: TrendKeyword,
        region: Region,
        sell_price: Decimal,
        cost_price: Figure,
        margin_pct: Figure,
        listing_count: u64,
    ) -> Self {
        Self {
            keyword,
            region,
            sell_price,
            cost_price,
            margin_pct,
            listing_count,
        }
    }

    pub fn keyword(&self) -> &TrendKeyword {
        &self.keyword
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn sell_price(&self) -> Decimal {
        self.sell_price
    }

    pub fn cost_price(&self) -> Figure {
        self.cost_price
    }

    pub fn margin_pct(&self) -> Figure {
        self.margin_pct
    }

    pub fn listing_count(&self) -> u64 {
        self.listing_count
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) → listings {}, margin {}",
            self.keyword, self.region, self.listing_count, self.margin_pct
        )
    }
}

// ---------------------------------------------------------------------------
// Feed outcome
// ---------------------------------------------------------------------------

/// Result of one trend-feed attempt, kept as data so fallback selection
/// is an ordinary function instead of nested error handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome<T> {
    Ok(T),
    Failed(String),
}

impl<T> From<anyhow::Result<T>> for FeedOutcome<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(v) => FeedOutcome::Ok(v),
            Err(e) => FeedOutcome::Failed(format!("{e:#}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Typed failures surfaced to the entry point.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("marketplace App ID required. Provide via flag, env var, or prompt.")]
    MissingCredential,

    #[error("Unknown region: {0} (expected one of AU, UK, US)")]
    UnknownRegion(String),

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Marketplace error {status}: {body}")]
    Marketplace { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
