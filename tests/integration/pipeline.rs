//! End-to-end discovery runs over in-memory services.

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use trendscout::engine::discovery::{DiscoveryOrchestrator, RunSummary};
use trendscout::engine::evaluator::{CandidateEvaluator, FilterPolicy};
use trendscout::report;
use trendscout::trends::TrendProvider;
use trendscout::types::{Figure, Region};

use crate::fakes::{FakeMarketplace, FakeSupplier, FakeTrendFeed};

struct Harness {
    primary: FakeTrendFeed,
    secondary: FakeTrendFeed,
    marketplace: FakeMarketplace,
    supplier: FakeSupplier,
}

impl Harness {
    /// AU served by the primary feed, UK only by the secondary, US by neither.
    fn standard() -> Self {
        let primary = FakeTrendFeed::new("primary").with_terms(
            Region::Au,
            &["Phone Case", "phone case", "yoga mat", "broken", "lamp"],
        );
        let secondary =
            FakeTrendFeed::new("secondary").with_terms(Region::Uk, &["Kettle", "LED strip"]);
        let marketplace = FakeMarketplace::new()
            .quote("phone case", 40, dec!(20.0))
            .quote("yoga mat", 12, dec!(18.0))
            .quote("lamp", 8, dec!(30.0))
            .quote("kettle", 300, dec!(10.0))
            .quote("led strip", 100, dec!(10.0))
            .failing("broken");
        let supplier = FakeSupplier::new()
            .cost("phone case", dec!(10.0))
            .cost("led strip", dec!(2.0));
        Self {
            primary,
            secondary,
            marketplace,
            supplier,
        }
    }

    fn orchestrator(&self) -> DiscoveryOrchestrator {
        DiscoveryOrchestrator::new(
            TrendProvider::new(Box::new(self.primary.clone()), Box::new(self.secondary.clone())),
            CandidateEvaluator::new(
                Box::new(self.marketplace.clone()),
                Box::new(self.supplier.clone()),
                FilterPolicy::default(),
            ),
        )
    }
}

#[tokio::test]
async fn test_full_run_collects_candidates_across_regions() {
    let h = Harness::standard();
    let run = h.orchestrator().discover(&Region::ALL, 20).await;

    let mut found: Vec<(String, Region, Figure)> = run
        .candidates
        .iter()
        .map(|c| (c.keyword().to_string(), c.region(), c.margin_pct()))
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        found,
        vec![
            ("led strip".to_string(), Region::Uk, Figure::Known(dec!(80.0))),
            ("phone case".to_string(), Region::Au, Figure::Known(dec!(50.0))),
            ("yoga mat".to_string(), Region::Au, Figure::Unknown),
        ]
    );
    assert_eq!(
        run.summary,
        RunSummary {
            regions_scanned: 3,
            keywords_evaluated: 6,
            accepted: 3,
            rejected: 2,
            failed: 1,
        }
    );
}

#[tokio::test]
async fn test_secondary_feed_only_used_after_primary_failure() {
    let h = Harness::standard();
    h.orchestrator().discover(&Region::ALL, 20).await;

    assert_eq!(h.primary.calls(), vec![Region::Au, Region::Uk, Region::Us]);
    assert_eq!(h.secondary.calls(), vec![Region::Uk, Region::Us]);
}

#[tokio::test]
async fn test_marketplace_queried_with_region_site() {
    let h = Harness::standard();
    h.orchestrator().discover(&Region::ALL, 20).await;

    let calls = h.marketplace.calls();
    assert!(calls.contains(&("phone case".to_string(), "EBAY-AU".to_string())));
    assert!(calls.contains(&("kettle".to_string(), "EBAY-GB".to_string())));
    assert!(calls.iter().all(|(_, site)| site != "EBAY-US"));
}

#[tokio::test]
async fn test_supplier_only_consulted_after_price_filters() {
    let h = Harness::standard();
    h.orchestrator().discover(&Region::ALL, 20).await;

    let mut calls = h.supplier.calls();
    calls.sort();
    assert_eq!(calls, vec!["led strip", "phone case", "yoga mat"]);
}

#[tokio::test]
async fn test_top_n_caps_keywords_per_region() {
    let h = Harness::standard();
    let run = h.orchestrator().discover(&Region::ALL, 1).await;

    assert_eq!(run.summary.keywords_evaluated, 2);
    let names: Vec<String> = run.candidates.iter().map(|c| c.keyword().to_string()).collect();
    assert_eq!(names, vec!["phone case"]);
}

#[tokio::test]
async fn test_candidates_respect_thresholds() {
    let h = Harness::standard();
    let run = h.orchestrator().discover(&Region::ALL, 20).await;

    for c in &run.candidates {
        assert!(c.sell_price() <= dec!(25.0));
        assert!(c.listing_count() <= 250);
        if let Figure::Known(m) = c.margin_pct() {
            assert!(m >= dec!(30.0));
        }
    }
}

#[tokio::test]
async fn test_report_written_in_margin_order() {
    let h = Harness::standard();
    let mut run = h.orchestrator().discover(&Region::ALL, 20).await;

    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2025, 7, 16, 12, 30, 0).unwrap();
    let path = report::write_report(dir.path(), &mut run.candidates, now).unwrap();

    let text = std::fs::read_to_string(path).unwrap();
    let keywords: Vec<&str> = text
        .lines()
        .skip(1)
        .filter_map(|l| l.split(',').next())
        .collect();
    assert_eq!(keywords, vec!["led strip", "phone case", "yoga mat"]);
}

#[tokio::test]
async fn test_all_feeds_down_yields_empty_run() {
    let h = Harness {
        primary: FakeTrendFeed::new("primary"),
        secondary: FakeTrendFeed::new("secondary"),
        marketplace: FakeMarketplace::new(),
        supplier: FakeSupplier::new(),
    };
    let run = h.orchestrator().discover(&Region::ALL, 20).await;

    assert!(run.candidates.is_empty());
    assert_eq!(run.summary.keywords_evaluated, 0);
    assert!(h.marketplace.calls().is_empty());
}
