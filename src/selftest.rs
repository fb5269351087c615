//! Built-in self-test mode (`--run-tests`).
//!
//! Exercises credential resolution and the filter policy against fixed
//! in-memory services. No network, no files.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::{ExposeSecret, SecretString};

use crate::credentials::{resolve_app_id, CredentialSource};
use crate::engine::evaluator::{CandidateEvaluator, Evaluation, FilterPolicy};
use crate::marketplace::MarketplaceQuoteService;
use crate::supplier::SourceCostService;
use crate::types::{CostQuote, Figure, MarketplaceStats, Region, ScoutError, TrendKeyword};

struct FixedQuote(MarketplaceStats);

#[async_trait]
impl MarketplaceQuoteService for FixedQuote {
    async fn get_stats(&self, _keyword: &str, _site_id: &str) -> Result<MarketplaceStats> {
        Ok(self.0.clone())
    }
}

struct FixedCost(CostQuote);

#[async_trait]
impl SourceCostService for FixedCost {
    async fn get_lowest_cost(&self, _keyword: &str) -> CostQuote {
        self.0
    }
}

/// Outcome of one named check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub error: Option<String>,
}

impl CheckResult {
    fn from_bool(name: &'static str, ok: bool, detail: impl FnOnce() -> String) -> Self {
        Self {
            name,
            error: (!ok).then(detail),
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

async fn evaluate_fixed(avg: Option<Decimal>, count: u64, cost: CostQuote) -> Result<Evaluation> {
    let evaluator = CandidateEvaluator::new(
        Box::new(FixedQuote(MarketplaceStats {
            listing_count: count,
            average_price: avg,
        })),
        Box::new(FixedCost(cost)),
        FilterPolicy::default(),
    );
    let Some(keyword) = TrendKeyword::new("self test") else {
        anyhow::bail!("self-test keyword rejected");
    };
    evaluator.evaluate(&keyword, Region::Us).await
}

fn margin_of(eval: &Result<Evaluation>) -> Option<Figure> {
    match eval {
        Ok(Evaluation::Accepted(c)) => Some(c.margin_pct()),
        _ => None,
    }
}

fn value(resolved: &Result<(SecretString, CredentialSource), ScoutError>) -> Option<String> {
    resolved.as_ref().ok().map(|(s, _)| s.expose_secret().clone())
}

fn credential_checks() -> Vec<CheckResult> {
    let flag = resolve_app_id(Some("Y"), Some("X"), || None);
    let env = resolve_app_id(None, Some("X"), || None);
    let prompt = resolve_app_id(None, None, || Some("Z".to_string()));
    let empty = resolve_app_id(None, None, || Some(String::new()));

    vec![
        CheckResult::from_bool(
            "credential_flag_overrides_env",
            value(&flag).as_deref() == Some("Y"),
            || format!("got {:?}", value(&flag)),
        ),
        CheckResult::from_bool(
            "credential_from_env",
            value(&env).as_deref() == Some("X"),
            || format!("got {:?}", value(&env)),
        ),
        CheckResult::from_bool(
            "credential_from_prompt",
            value(&prompt).as_deref() == Some("Z"),
            || format!("got {:?}", value(&prompt)),
        ),
        CheckResult::from_bool(
            "credential_missing_is_fatal",
            matches!(empty, Err(ScoutError::MissingCredential)),
            || "empty prompt did not fail".to_string(),
        ),
    ]
}

async fn policy_checks() -> Vec<CheckResult> {
    let half = evaluate_fixed(Some(dec!(20.0)), 10, Figure::Known(dec!(10.0))).await;
    let fifth = evaluate_fixed(Some(dec!(20.0)), 10, Figure::Known(dec!(16.0))).await;
    let unknown = evaluate_fixed(Some(dec!(20.0)), 10, Figure::Unknown).await;
    let unpriced = evaluate_fixed(None, 3, Figure::Unknown).await;
    let crowded = evaluate_fixed(Some(dec!(10.0)), 251, Figure::Unknown).await;

    vec![
        CheckResult::from_bool(
            "fifty_percent_margin_accepted",
            margin_of(&half) == Some(Figure::Known(dec!(50.0))),
            || format!("got {half:?}"),
        ),
        CheckResult::from_bool(
            "twenty_percent_margin_rejected",
            matches!(fifth, Ok(Evaluation::Rejected(_))),
            || format!("got {fifth:?}"),
        ),
        CheckResult::from_bool(
            "unknown_cost_accepted",
            margin_of(&unknown) == Some(Figure::Unknown),
            || format!("got {unknown:?}"),
        ),
        CheckResult::from_bool(
            "no_priced_listings_rejected",
            matches!(unpriced, Ok(Evaluation::Rejected(_))),
            || format!("got {unpriced:?}"),
        ),
        CheckResult::from_bool(
            "listing_cap_enforced",
            matches!(crowded, Ok(Evaluation::Rejected(_))),
            || format!("got {crowded:?}"),
        ),
    ]
}

/// Run every self-test check.
pub async fn run() -> Vec<CheckResult> {
    let mut results = credential_checks();
    results.extend(policy_checks().await);
    results
}
