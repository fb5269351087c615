//! Discovery run: regions × trending keywords → accepted candidates.
//!
//! Strictly sequential. A failure while evaluating one keyword is logged
//! and counted, and the loop moves on; a run never aborts part-way.

use tracing::{info, warn};

use super::evaluator::{CandidateEvaluator, Evaluation};
use crate::trends::TrendProvider;
use crate::types::{Candidate, Region};

/// Counters for one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub regions_scanned: usize,
    pub keywords_evaluated: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Output of a discovery run. Candidate order carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub candidates: Vec<Candidate>,
    pub summary: RunSummary,
}

pub struct DiscoveryOrchestrator {
    trends: TrendProvider,
    evaluator: CandidateEvaluator,
}

impl DiscoveryOrchestrator {
    pub fn new(trends: TrendProvider, evaluator: CandidateEvaluator) -> Self {
        Self { trends, evaluator }
    }

    /// Evaluate up to `top_n` trending keywords in each requested region.
    ///
    /// Regions are visited in the fixed AU, UK, US order regardless of the
    /// order given; duplicates are ignored.
    pub async fn discover(&self, regions: &[Region], top_n: usize) -> Discovery {
        let mut out = Discovery::default();

        for region in Region::ALL.into_iter().filter(|r| regions.contains(r)) {
            info!(region = %region, "Checking trends");
            out.summary.regions_scanned += 1;

            let keywords = self.trends.get_trending_keywords(region, top_n).await;
            for keyword in keywords {
                out.summary.keywords_evaluated += 1;
                match self.evaluator.evaluate(&keyword, region).await {
                    Ok(Evaluation::Accepted(candidate)) => {
                        info!(
                            keyword = %keyword,
                            region = %region,
                            listings = candidate.listing_count(),
                            margin = %candidate.margin_pct(),
                            "✓ Candidate accepted"
                        );
                        out.summary.accepted += 1;
                        out.candidates.push(candidate);
                    }
                    Ok(Evaluation::Rejected(_)) => {
                        out.summary.rejected += 1;
                    }
                    Err(e) => {
                        warn!(
                            keyword = %keyword,
                            region = %region,
                            error = %e,
                            "Keyword evaluation failed, skipping"
                        );
                        out.summary.failed += 1;
                    }
                }
            }
        }

        info!(
            regions = out.summary.regions_scanned,
            keywords = out.summary.keywords_evaluated,
            accepted = out.summary.accepted,
            rejected = out.summary.rejected,
            failed = out.summary.failed,
            "Discovery complete"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluator::FilterPolicy;
    use crate::marketplace::MockMarketplaceQuoteService;
    use crate::supplier::MockSourceCostService;
    use crate::trends::MockTrendFeed;
    use crate::types::{Figure, MarketplaceStats};
    use anyhow::anyhow;
    use rust_decimal_macros::dec;

    fn feed(terms: &'static [&'static str]) -> MockTrendFeed {
        let mut f = MockTrendFeed::new();
        f.expect_name().return_const("fixed");
        f.expect_fetch()
            .returning(move |_| Ok(terms.iter().map(|s| s.to_string()).collect()));
        f
    }

    fn idle_feed() -> MockTrendFeed {
        let mut f = MockTrendFeed::new();
        f.expect_name().return_const("idle");
        f.expect_fetch().never();
        f
    }

    #[tokio::test]
    async fn test_failure_on_one_keyword_does_not_abort() {
        let mut market = MockMarketplaceQuoteService::new();
        market.expect_get_stats().returning(|kw, _| {
            if kw == "broken" {
                Err(anyhow!("connection reset"))
            } else {
                Ok(MarketplaceStats {
                    listing_count: 12,
                    average_price: Some(dec!(15)),
                })
            }
        });
        let mut supplier = MockSourceCostService::new();
        supplier.expect_get_lowest_cost().return_const(Figure::Unknown);

        let orchestrator = DiscoveryOrchestrator::new(
            TrendProvider::new(Box::new(feed(&["good", "broken", "fine"])), Box::new(idle_feed())),
            CandidateEvaluator::new(Box::new(market), Box::new(supplier), FilterPolicy::default()),
        );

        let run = orchestrator.discover(&[Region::Us], 20).await;
        let names: Vec<&str> = run.candidates.iter().map(|c| c.keyword().as_str()).collect();
        assert_eq!(names, vec!["good", "fine"]);
        assert_eq!(
            run.summary,
            RunSummary {
                regions_scanned: 1,
                keywords_evaluated: 3,
                accepted: 2,
                rejected: 0,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_regions_visited_in_fixed_order() {
        let mut market = MockMarketplaceQuoteService::new();
        market.expect_get_stats().returning(|_, _| {
            Ok(MarketplaceStats {
                listing_count: 1,
                average_price: Some(dec!(5)),
            })
        });
        let mut supplier = MockSourceCostService::new();
        supplier.expect_get_lowest_cost().return_const(Figure::Known(dec!(1)));

        let orchestrator = DiscoveryOrchestrator::new(
            TrendProvider::new(Box::new(feed(&["sticker"])), Box::new(idle_feed())),
            CandidateEvaluator::new(Box::new(market), Box::new(supplier), FilterPolicy::default()),
        );

        let run = orchestrator
            .discover(&[Region::Us, Region::Au, Region::Us], 20)
            .await;
        let regions: Vec<Region> = run.candidates.iter().map(|c| c.region()).collect();
        assert_eq!(regions, vec![Region::Au, Region::Us]);
        assert_eq!(run.summary.regions_scanned, 2);
    }
}
