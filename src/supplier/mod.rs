//! Wholesale supplier integrations.
//!
//! Defines the `SourceCostService` trait and the AliExpress affiliate
//! catalog implementation.

pub mod aliexpress;

use async_trait::async_trait;

use crate::types::CostQuote;

/// Lowest wholesale unit price for a keyword.
///
/// Infallible by contract: misconfiguration, network errors, and
/// unparseable payloads all map to `Figure::Unknown`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceCostService: Send + Sync {
    async fn get_lowest_cost(&self, keyword: &str) -> CostQuote;
}
