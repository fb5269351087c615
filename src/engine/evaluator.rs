//! Candidate evaluation.
//!
//! Combines marketplace selling-price statistics with supplier cost for a
//! single (keyword, region) pair and applies the filter policy:
//!
//! 1. Marketplace stats (errors propagate to the caller).
//! 2. Reject when no priced listings, average above the price ceiling, or
//!    too many competing listings.
//! 3. Supplier cost (never fails).
//! 4. Known cost: reject when margin is below the minimum.
//! 5. Unknown cost: margin is `Unknown` and the margin filter is skipped.
//!
//! Absence of cost data cannot disprove a candidate, so supplier downtime
//! never blocks discovery; it only loses the margin check.

use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;
use tracing::debug;

use crate::config::FilterConfig;
use crate::marketplace::MarketplaceQuoteService;
use crate::supplier::SourceCostService;
use crate::types::{Candidate, Figure, Region, TrendKeyword};

/// Decimal places for reported prices.
const PRICE_DP: u32 = 2;
/// Decimal places for reported margin percentage.
const MARGIN_PCT_DP: u32 = 1;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Acceptance thresholds applied to every keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPolicy {
    pub max_sell_price: Decimal,
    /// Fraction, not percent (0.30 = 30%).
    pub min_margin: Decimal,
    pub max_listings: u64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::from(&FilterConfig::default())
    }
}

impl From<&FilterConfig> for FilterPolicy {
    fn from(cfg: &FilterConfig) -> Self {
        Self {
            max_sell_price: cfg.max_sell_price,
            min_margin: cfg.min_margin,
            max_listings: cfg.max_listings,
        }
    }
}

/// Margin as a fraction of the selling price.
pub fn margin(sell_price: Decimal, cost: Decimal) -> Decimal {
    (sell_price - cost) / sell_price
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a keyword was not accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    NoPricedListings,
    PriceTooHigh { average: Decimal },
    TooManyListings { count: u64 },
    MarginTooLow { margin: Decimal },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoPricedListings => write!(f, "no priced listings"),
            Rejection::PriceTooHigh { average } => {
                write!(f, "average price {:.2} above ceiling", average)
            }
            Rejection::TooManyListings { count } => write!(f, "{count} competing listings"),
            Rejection::MarginTooLow { margin } => {
                write!(f, "margin {:.1}% below minimum", margin * dec!(100))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Accepted(Candidate),
    Rejected(Rejection),
}

impl Evaluation {
    pub fn into_candidate(self) -> Option<Candidate> {
        match self {
            Evaluation::Accepted(c) => Some(c),
            Evaluation::Rejected(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

pub struct CandidateEvaluator {
    marketplace: Box<dyn MarketplaceQuoteService>,
    supplier: Box<dyn SourceCostService>,
    policy: FilterPolicy,
}

impl CandidateEvaluator {
    pub fn new(
        marketplace: Box<dyn MarketplaceQuoteService>,
        supplier: Box<dyn SourceCostService>,
        policy: FilterPolicy,
    ) -> Self {
        Self {
            marketplace,
            supplier,
            policy,
        }
    }

    /// Evaluate one keyword in one region.
    ///
    /// Only a marketplace failure is returned as `Err`; every other outcome
    /// is an `Evaluation`.
    pub async fn evaluate(&self, keyword: &TrendKeyword, region: Region) -> Result<Evaluation> {
        let stats = self
            .marketplace
            .get_stats(keyword.as_str(), region.site_id())
            .await?;

        let Some(sell) = stats.average_price.filter(|p| *p > Decimal::ZERO) else {
            return Ok(self.reject(keyword, region, Rejection::NoPricedListings));
        };
        if sell > self.policy.max_sell_price {
            return Ok(self.reject(keyword, region, Rejection::PriceTooHigh { average: sell }));
        }
        if stats.listing_count > self.policy.max_listings {
            return Ok(self.reject(
                keyword,
                region,
                Rejection::TooManyListings {
                    count: stats.listing_count,
                },
            ));
        }

        let cost = self.supplier.get_lowest_cost(keyword.as_str()).await;

        let margin_pct = match cost {
            Figure::Known(c) => {
                let m = margin(sell, c);
                if m < self.policy.min_margin {
                    return Ok(self.reject(keyword, region, Rejection::MarginTooLow { margin: m }));
                }
                Figure::Known((m * dec!(100)).round_dp(MARGIN_PCT_DP))
            }
            Figure::Unknown => Figure::Unknown,
        };

        let cost_price = match cost {
            Figure::Known(c) => Figure::Known(c.round_dp(PRICE_DP)),
            Figure::Unknown => Figure::Unknown,
        };

        Ok(Evaluation::Accepted(Candidate::new(
            keyword.clone(),
            region,
            sell.round_dp(PRICE_DP),
            cost_price,
            margin_pct,
            stats.listing_count,
        )))
    }

    fn reject(&self, keyword: &TrendKeyword, region: Region, reason: Rejection) -> Evaluation {
        debug!(keyword = %keyword, region = %region, reason = %reason, "Keyword rejected");
        Evaluation::Rejected(reason)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
