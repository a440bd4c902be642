use crate::engine::analytics::AnalyticsReport;
use crate::engine::filter::FilterSummary;
use crate::enrichment::EnrichmentStats;
use crate::transaction::Transaction;

use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

const RULE: &str = "============================================================";
const TOP_CUSTOMERS_SHOWN: usize = 5;

pub struct ReportContext<'a> {
    pub transactions: &'a [Transaction],
    pub summary: &'a FilterSummary,
    pub analytics: &'a AnalyticsReport,
    pub enrichment: Option<&'a EnrichmentStats>,
}

pub fn write_report<W: Write>(mut writer: W, ctx: &ReportContext<'_>) -> io::Result<()> {
    let analytics = ctx.analytics;

    writeln!(writer, "{RULE}")?;
    writeln!(writer, "                 SALES ANALYTICS REPORT")?;
    writeln!(writer, "{RULE}")?;
    writeln!(writer, "Records processed: {}", ctx.transactions.len())?;
    writeln!(writer)?;

    writeln!(writer, "DATA QUALITY")?;
    writeln!(writer, "  Total input:         {}", ctx.summary.total_input)?;
    writeln!(writer, "  Invalid removed:     {}", ctx.summary.invalid_removed)?;
    writeln!(writer, "  Filtered by region:  {}", ctx.summary.filtered_by_region)?;
    writeln!(writer, "  Filtered by amount:  {}", ctx.summary.filtered_by_amount)?;
    writeln!(writer, "  Final count:         {}", ctx.summary.final_count)?;
    writeln!(writer)?;

    writeln!(writer, "OVERALL SUMMARY")?;
    writeln!(writer, "  Total revenue:       {}", money(analytics.total_revenue))?;
    writeln!(writer, "  Transactions:        {}", ctx.transactions.len())?;
    writeln!(
        writer,
        "  Average order value: {}",
        money(average_order_value(analytics.total_revenue, ctx.transactions.len()))
    )?;
    match date_range(ctx.transactions) {
        Some((first, last)) => writeln!(writer, "  Date range:          {first} to {last}")?,
        None => writeln!(writer, "  Date range:          n/a")?,
    }
    writeln!(writer)?;

    writeln!(writer, "REGION-WISE PERFORMANCE")?;
    writeln!(writer, "  {:<14}{:>16}{:>10}{:>14}", "Region", "Sales", "% Total", "Transactions")?;
    for region in &analytics.region_wise_performance {
        writeln!(
            writer,
            "  {:<14}{:>16}{:>9}%{:>14}",
            region.region,
            money(region.total_sales),
            region.percentage,
            region.transaction_count
        )?;
    }
    writeln!(writer)?;

    writeln!(writer, "TOP {} PRODUCTS", analytics.top_selling_products.len())?;
    writeln!(writer, "  {:<5}{:<24}{:>10}{:>16}", "Rank", "Product", "Quantity", "Revenue")?;
    for (rank, product) in analytics.top_selling_products.iter().enumerate() {
        writeln!(
            writer,
            "  {:<5}{:<24}{:>10}{:>16}",
            rank + 1,
            product.product_name,
            product.total_quantity,
            money(product.total_revenue)
        )?;
    }
    writeln!(writer)?;

    writeln!(writer, "TOP CUSTOMERS")?;
    writeln!(writer, "  {:<5}{:<12}{:>16}{:>8}{:>14}", "Rank", "Customer", "Spent", "Orders", "Avg Order")?;
    for (rank, customer) in analytics
        .top_customers
        .iter()
        .take(TOP_CUSTOMERS_SHOWN)
        .enumerate()
    {
        writeln!(
            writer,
            "  {:<5}{:<12}{:>16}{:>8}{:>14}",
            rank + 1,
            customer.customer_id,
            money(customer.total_spent),
            customer.purchase_count,
            money(customer.avg_order_value)
        )?;
    }
    writeln!(writer)?;

    writeln!(writer, "DAILY SALES TREND")?;
    writeln!(writer, "  {:<12}{:>16}{:>14}{:>18}", "Date", "Revenue", "Transactions", "Unique Customers")?;
    for day in &analytics.daily_sales_trend {
        writeln!(
            writer,
            "  {:<12}{:>16}{:>14}{:>18}",
            day.date,
            money(day.revenue),
            day.transaction_count,
            day.unique_customers
        )?;
    }
    writeln!(writer)?;

    writeln!(writer, "PEAK SALES DAY")?;
    match &analytics.peak_sales_day {
        Some(peak) => writeln!(
            writer,
            "  {} with {} across {} transactions",
            peak.date,
            money(peak.revenue),
            peak.transaction_count
        )?,
        None => writeln!(writer, "  No sales data")?,
    }
    writeln!(writer)?;

    writeln!(writer, "LOW PERFORMING PRODUCTS")?;
    if analytics.low_performers.is_empty() {
        writeln!(writer, "  None")?;
    }
    for product in &analytics.low_performers {
        writeln!(
            writer,
            "  {:<24}{:>10}{:>16}",
            product.product_name,
            product.total_quantity,
            money(product.total_revenue)
        )?;
    }
    writeln!(writer)?;

    writeln!(writer, "API ENRICHMENT SUMMARY")?;
    match ctx.enrichment {
        Some(stats) => {
            writeln!(writer, "  Products enriched:   {}/{}", stats.matched, stats.total)?;
            writeln!(writer, "  Success rate:        {}%", stats.success_rate)?;
            if !stats.unmatched_products.is_empty() {
                writeln!(writer, "  Not found:           {}", stats.unmatched_products.join(", "))?;
            }
        }
        None => writeln!(writer, "  Enrichment not performed")?,
    }
    writeln!(writer, "{RULE}")?;

    Ok(())
}

pub fn save_report<P: AsRef<Path>>(path: P, ctx: &ReportContext<'_>) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = io::BufWriter::new(std::fs::File::create(path)?);
    write_report(file, ctx)?;
    info!(path = %path.display(), "Saved report");
    Ok(())
}

fn money(value: Decimal) -> String {
    format!("${:.2}", value)
}

fn average_order_value(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp(2)
}

fn date_range(transactions: &[Transaction]) -> Option<(&str, &str)> {
    let first = transactions.iter().map(|t| t.date.as_str()).min()?;
    let last = transactions.iter().map(|t| t.date.as_str()).max()?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analytics::{run_analytics, AnalyticsOptions};
    use std::str::FromStr;

    fn records() -> Vec<Transaction> {
        vec![
            Transaction::new("T1", "2024-12-02", "P1", "Laptop", 2, Decimal::from(500), "C1", "north"),
            Transaction::new("T2", "2024-12-01", "P2", "Mouse", 4, Decimal::from_str("12.5").unwrap(), "C2", "south"),
        ]
    }

    #[test]
    fn test_write_report_sections() {
        let transactions = records();
        let analytics = run_analytics(&transactions, &AnalyticsOptions::default());
        let summary = FilterSummary {
            total_input: 3,
            invalid_removed: 1,
            filtered_by_region: 0,
            filtered_by_amount: 0,
            final_count: 2,
        };
        let ctx = ReportContext {
            transactions: &transactions,
            summary: &summary,
            analytics: &analytics,
            enrichment: None,
        };

        let mut buf = Vec::new();
        write_report(&mut buf, &ctx).unwrap();
        let output = String::from_utf8(buf).unwrap();

        assert!(output.contains("Total revenue:       $1050.00"));
        assert!(output.contains("Average order value: $525.00"));
        assert!(output.contains("Date range:          2024-12-01 to 2024-12-02"));
        assert!(output.contains("Invalid removed:     1"));
        assert!(output.contains("2024-12-02 with $1000.00 across 1 transactions"));
        assert!(output.contains("Enrichment not performed"));
    }

    #[test]
    fn test_write_report_empty() {
        let analytics = run_analytics(&[], &AnalyticsOptions::default());
        let summary = FilterSummary::default();
        let ctx = ReportContext {
            transactions: &[],
            summary: &summary,
            analytics: &analytics,
            enrichment: None,
        };

        let mut buf = Vec::new();
        write_report(&mut buf, &ctx).unwrap();
        let output = String::from_utf8(buf).unwrap();

        assert!(output.contains("Total revenue:       $0.00"));
        assert!(output.contains("Date range:          n/a"));
        assert!(output.contains("No sales data"));
    }
}
