//! TRENDSCOUT: trending low-ticket resale product discovery.
//!
//! Entry point. Parses the command line, loads configuration, initialises
//! structured logging, and runs one of three modes: self-test, trends-only
//! demo, or the full discovery run that writes a CSV snapshot.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use trendscout::config::AppConfig;
use trendscout::credentials::{
    prompt_terminal, resolve_app_id, startup_diagnostic, MISSING_CREDENTIAL_EXIT,
};
use trendscout::engine::discovery::DiscoveryOrchestrator;
use trendscout::engine::evaluator::{CandidateEvaluator, FilterPolicy};
use trendscout::marketplace::ebay::EbayFindingClient;
use trendscout::report;
use trendscout::selftest;
use trendscout::supplier::aliexpress::{AliExpressClient, SupplierCredentials};
use trendscout::trends::daily::DailyTrendsFeed;
use trendscout::trends::hot_searches::HotSearchesFeed;
use trendscout::trends::TrendProvider;
use trendscout::types::Region;

/// Find trending low-ticket products.
#[derive(Parser, Debug)]
#[command(name = "trendscout", version, about, long_about = None)]
struct Cli {
    /// eBay App ID (overrides env)
    #[arg(long)]
    ebay_app_id: Option<String>,

    /// Demo mode: trends only, skip marketplace calls
    #[arg(long)]
    demo: bool,

    /// Run built-in self-tests and exit
    #[arg(long)]
    run_tests: bool,

    /// Path to configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Restrict the run to these regions (AU, UK, US); repeatable
    #[arg(long = "region", value_name = "CODE")]
    regions: Vec<Region>,

    /// Directory for the CSV report
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    if cli.run_tests {
        run_self_tests().await;
        return Ok(());
    }

    init_logging();
    let cfg = AppConfig::load_or_default(&cli.config)?;

    let regions = if cli.regions.is_empty() {
        Region::ALL.to_vec()
    } else {
        cli.regions.clone()
    };
    let top_n = cfg.filters.top_n_trends;

    let trends = TrendProvider::new(
        Box::new(DailyTrendsFeed::new(cfg.trends.clone(), &cfg.http)?),
        Box::new(HotSearchesFeed::new(cfg.trends.clone(), &cfg.http)?),
    );

    if cli.demo {
        for region in Region::ALL.into_iter().filter(|r| regions.contains(r)) {
            let keywords = trends.get_trending_keywords(region, top_n).await;
            let joined: Vec<&str> = keywords.iter().map(|k| k.as_str()).collect();
            println!("{region} trends: {}", joined.join(", "));
        }
        return Ok(());
    }

    let env_app_id = AppConfig::resolve_env(&cfg.marketplace.app_id_env);
    let resolved = resolve_app_id(
        cli.ebay_app_id.as_deref(),
        env_app_id.as_deref(),
        prompt_terminal,
    );
    let app_id = match resolved {
        Ok((app_id, source)) => {
            info!(source = ?source, "Marketplace credential resolved");
            app_id
        }
        Err(e) => {
            eprintln!("{}", startup_diagnostic(&e));
            std::process::exit(MISSING_CREDENTIAL_EXIT);
        }
    };

    let marketplace = EbayFindingClient::new(
        app_id,
        cfg.marketplace.clone(),
        cfg.filters.max_sell_price,
        &cfg.http,
        cfg.retry.clone(),
    )?;
    let supplier = AliExpressClient::new(
        SupplierCredentials::from_env(&cfg.supplier),
        cfg.supplier.clone(),
        &cfg.http,
        cfg.retry.clone(),
    )?;
    let evaluator = CandidateEvaluator::new(
        Box::new(marketplace),
        Box::new(supplier),
        FilterPolicy::from(&cfg.filters),
    );
    let orchestrator = DiscoveryOrchestrator::new(trends, evaluator);

    info!(
        regions = ?regions,
        top_n,
        max_sell_price = %cfg.filters.max_sell_price,
        min_margin = %cfg.filters.min_margin,
        max_listings = cfg.filters.max_listings,
        "TRENDSCOUT starting discovery"
    );

    let mut run = orchestrator.discover(&regions, top_n).await;

    if run.candidates.is_empty() {
        println!("No products met criteria.");
        return Ok(());
    }

    let path = report::write_report(&cli.output_dir, &mut run.candidates, Utc::now())?;
    println!("Saved {} products → {}", run.candidates.len(), path.display());
    println!("{}", report::preview_table(&run.candidates, report::PREVIEW_ROWS));

    Ok(())
}

/// Run the built-in checks, print one line per check, exit 1 on failure.
async fn run_self_tests() {
    let results = selftest::run().await;
    let mut failed = 0;
    for r in &results {
        match &r.error {
            None => println!("ok      {}", r.name),
            Some(e) => {
                failed += 1;
                println!("FAILED  {} ({e})", r.name);
            }
        }
    }
    println!("{} passed, {failed} failed", results.len() - failed);
    if failed > 0 {
        std::process::exit(1);
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trendscout=info"));

    let json_logging = std::env::var("TRENDSCOUT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
