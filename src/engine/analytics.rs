use crate::transaction::Transaction;

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_LOW_THRESHOLD: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsOptions {
    pub top_n: usize,
    pub low_threshold: u64,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            low_threshold: DEFAULT_LOW_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionStats {
    pub region: String,
    pub total_sales: Decimal,
    pub transaction_count: usize,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub product_name: String,
    pub total_quantity: u64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerStats {
    pub customer_id: String,
    pub total_spent: Decimal,
    pub purchase_count: usize,
    pub avg_order_value: Decimal,
    /// Distinct product names in first-purchase order.
    pub products_bought: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySales {
    pub date: String,
    pub revenue: Decimal,
    pub transaction_count: usize,
    pub unique_customers: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakDay {
    pub date: String,
    pub revenue: Decimal,
    pub transaction_count: usize,
}

/// The seven analytical views computed over one run's filtered records.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsReport {
    pub total_revenue: Decimal,
    pub region_wise_performance: Vec<RegionStats>,
    pub top_selling_products: Vec<ProductSales>,
    pub top_customers: Vec<CustomerStats>,
    pub daily_sales_trend: Vec<DailySales>,
    /// `None` when there are no records.
    pub peak_sales_day: Option<PeakDay>,
    pub low_performers: Vec<ProductSales>,
}

pub fn run_analytics(records: &[Transaction], options: &AnalyticsOptions) -> AnalyticsReport {
    AnalyticsReport {
        total_revenue: calculate_total_revenue(records),
        region_wise_performance: region_wise_sales(records),
        top_selling_products: top_selling_products(records, options.top_n),
        top_customers: customer_analysis(records),
        daily_sales_trend: daily_sales_trend(records),
        peak_sales_day: find_peak_sales_day(records),
        low_performers: low_performing_products(records, options.low_threshold),
    }
}

pub fn calculate_total_revenue(records: &[Transaction]) -> Decimal {
    records
        .iter()
        .map(Transaction::amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
        .round_dp(2)
}

pub fn region_wise_sales(records: &[Transaction]) -> Vec<RegionStats> {
    let overall_total = calculate_total_revenue(records);

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<RegionStats> = Vec::new();

    for tx in records {
        let slot = *index.entry(tx.region.as_str()).or_insert_with(|| {
            stats.push(RegionStats {
                region: tx.region.clone(),
                total_sales: Decimal::ZERO,
                transaction_count: 0,
                percentage: Decimal::ZERO,
            });
            stats.len() - 1
        });

        let entry = &mut stats[slot];
        entry.total_sales = entry.total_sales.saturating_add(tx.amount());
        entry.transaction_count += 1;
    }

    for entry in stats.iter_mut() {
        entry.percentage = percentage_of(entry.total_sales, overall_total);
    }

    // Stable: ties keep first-seen order.
    stats.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    stats
}

pub fn top_selling_products(records: &[Transaction], n: usize) -> Vec<ProductSales> {
    let mut products = product_totals(records);
    products.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
    products.truncate(n);
    products
}

pub fn customer_analysis(records: &[Transaction]) -> Vec<CustomerStats> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<CustomerStats> = Vec::new();

    for tx in records {
        let slot = *index.entry(tx.customer_id.as_str()).or_insert_with(|| {
            stats.push(CustomerStats {
                customer_id: tx.customer_id.clone(),
                total_spent: Decimal::ZERO,
                purchase_count: 0,
                avg_order_value: Decimal::ZERO,
                products_bought: Vec::new(),
            });
            stats.len() - 1
        });

        let entry = &mut stats[slot];
        entry.total_spent = entry.total_spent.saturating_add(tx.amount());
        entry.purchase_count += 1;
        if !entry.products_bought.contains(&tx.product_name) {
            entry.products_bought.push(tx.product_name.clone());
        }
    }

    for entry in stats.iter_mut() {
        if entry.purchase_count > 0 {
            entry.avg_order_value =
                (entry.total_spent / Decimal::from(entry.purchase_count)).round_dp(2);
        }
    }

    stats.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    stats
}

pub fn daily_sales_trend(records: &[Transaction]) -> Vec<DailySales> {
    // ISO dates sort lexicographically in chronological order.
    let mut days: BTreeMap<&str, (Decimal, usize, HashSet<&str>)> = BTreeMap::new();

    for tx in records {
        let (revenue, count, customers) = days
            .entry(tx.date.as_str())
            .or_insert_with(|| (Decimal::ZERO, 0, HashSet::new()));
        *revenue = revenue.saturating_add(tx.amount());
        *count += 1;
        customers.insert(tx.customer_id.as_str());
    }

    days.into_iter()
        .map(|(date, (revenue, transaction_count, customers))| DailySales {
            date: date.to_string(),
            revenue: revenue.round_dp(2),
            transaction_count,
            unique_customers: customers.len(),
        })
        .collect()
}

/// Earliest date wins a revenue tie.
pub fn find_peak_sales_day(records: &[Transaction]) -> Option<PeakDay> {
    let mut peak: Option<DailySales> = None;

    for day in daily_sales_trend(records) {
        let is_new_peak = peak
            .as_ref()
            .map_or(true, |best| day.revenue > best.revenue);
        if is_new_peak {
            peak = Some(day);
        }
    }

    peak.map(|day| PeakDay {
        date: day.date,
        revenue: day.revenue,
        transaction_count: day.transaction_count,
    })
}

pub fn low_performing_products(records: &[Transaction], threshold: u64) -> Vec<ProductSales> {
    let mut low: Vec<ProductSales> = product_totals(records)
        .into_iter()
        .filter(|p| p.total_quantity < threshold)
        .collect();
    low.sort_by(|a, b| a.total_quantity.cmp(&b.total_quantity));
    low
}

/// Per-product quantity and revenue, in first-seen order.
fn product_totals(records: &[Transaction]) -> Vec<ProductSales> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut products: Vec<ProductSales> = Vec::new();

    for tx in records {
        let slot = *index.entry(tx.product_name.as_str()).or_insert_with(|| {
            products.push(ProductSales {
                product_name: tx.product_name.clone(),
                total_quantity: 0,
                total_revenue: Decimal::ZERO,
            });
            products.len() - 1
        });

        let entry = &mut products[slot];
        entry.total_quantity = entry.total_quantity.saturating_add(tx.quantity.max(0) as u64);
        entry.total_revenue = entry.total_revenue.saturating_add(tx.amount());
    }

    products
}

fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED).round_dp(2)
}
