use sales_analytics::{
    engine::{
        analytics::{run_analytics, AnalyticsOptions, DEFAULT_LOW_THRESHOLD, DEFAULT_TOP_N},
        clean_transactions,
        filter::FilterCriteria,
    },
    enrichment::{
        create_product_mapping, enrich_transactions, enrichment_stats, load_catalog,
        save_enriched, ProductInfo,
    },
    load_transactions,
    report::{save_report, ReportContext},
};

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "sales-analytics",
    about = "Clean, filter and analyse pipe-delimited sales transactions"
)]
struct Cli {
    #[arg(default_value = "data/sales_data.txt", help = "Pipe-delimited sales file")]
    input: PathBuf,
    #[arg(long, value_name = "PATH", help = "Product catalog JSON used for enrichment")]
    catalog: Option<PathBuf>,
    #[arg(long, help = "Keep only transactions from this region")]
    region: Option<String>,
    #[arg(
        long = "min-amount",
        value_parser = parse_non_negative,
        help = "Keep transactions with amount strictly above this value"
    )]
    min_amount: Option<Decimal>,
    #[arg(long = "max-amount", help = "Keep transactions with amount at most this value")]
    max_amount: Option<Decimal>,
    #[arg(long = "top-n", default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
    #[arg(long = "low-threshold", default_value_t = DEFAULT_LOW_THRESHOLD)]
    low_threshold: u64,
    #[arg(long, default_value = "output/sales_report.txt")]
    report: PathBuf,
    #[arg(long = "enriched-output", default_value = "data/enriched_sales_data.txt")]
    enriched_output: PathBuf,
}

fn parse_non_negative(raw: &str) -> Result<Decimal, String> {
    let value: Decimal = raw.parse().map_err(|e| format!("invalid amount '{raw}': {e}"))?;
    if value.is_sign_negative() {
        return Err(format!("amount must not be negative, got {value}"));
    }
    Ok(value)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!(input = %cli.input.display(), "Processing sales data");
    let records = load_transactions(&cli.input)
        .with_context(|| format!("Failed to read sales data from '{}'", cli.input.display()))?;

    if records.is_empty() {
        warn!("No transactions parsed, stopping");
        return Ok(());
    }

    let criteria = FilterCriteria {
        region: cli.region,
        min_amount: cli.min_amount,
        max_amount: cli.max_amount,
    };
    let cleaned = clean_transactions(records, &criteria);

    let options = AnalyticsOptions {
        top_n: cli.top_n,
        low_threshold: cli.low_threshold,
    };

    // Analytics and catalog loading are independent of each other.
    let analytics_input = cleaned.transactions.clone();
    let analytics_task =
        tokio::task::spawn_blocking(move || run_analytics(&analytics_input, &options));
    let (analytics, catalog) = tokio::join!(analytics_task, fetch_catalog(cli.catalog));
    let analytics = analytics.context("Analytics task failed")?;
    info!(total_revenue = %analytics.total_revenue, "Analysis complete");

    let enrichment = match catalog {
        Some(products) => {
            let mapping = create_product_mapping(products);
            let enriched = enrich_transactions(&cleaned.transactions, &mapping);
            save_enriched(&cli.enriched_output, &enriched).with_context(|| {
                format!(
                    "Failed to write enriched data to '{}'",
                    cli.enriched_output.display()
                )
            })?;
            Some(enrichment_stats(&enriched))
        }
        None => None,
    };

    let ctx = ReportContext {
        transactions: &cleaned.transactions,
        summary: &cleaned.summary,
        analytics: &analytics,
        enrichment: enrichment.as_ref(),
    };
    save_report(&cli.report, &ctx)
        .with_context(|| format!("Failed to write report to '{}'", cli.report.display()))?;

    Ok(())
}

/// A missing or unreadable catalog disables enrichment for the run.
async fn fetch_catalog(path: Option<PathBuf>) -> Option<Vec<ProductInfo>> {
    let path = path?;
    match load_catalog(&path).await {
        Ok(products) => Some(products),
        Err(e) => {
            warn!(path = %path.display(), "Catalog unavailable: {}", e);
            None
        }
    }
}
