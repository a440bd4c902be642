use crate::transaction::{normalize_region, Transaction};

use rust_decimal::Decimal;

/// Optional user criteria applied to the validated set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub region: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub total_input: usize,
    pub invalid_removed: usize,
    pub filtered_by_region: usize,
    pub filtered_by_amount: usize,
    pub final_count: usize,
}

/// Keeps only records in `region` (title-cased before comparing). Returns how
/// many were removed; `None` removes nothing.
pub fn apply_region_filter(records: &mut Vec<Transaction>, region: Option<&str>) -> usize {
    let Some(region) = region else {
        return 0;
    };

    let wanted = normalize_region(region);
    let before = records.len();
    records.retain(|tx| tx.region == wanted);

    before - records.len()
}

/// Keeps records with `amount > min` and `amount <= max`. The minimum is
/// exclusive and the maximum inclusive. A max below the min leaves nothing.
pub fn apply_amount_filter(
    records: &mut Vec<Transaction>,
    min_amount: Option<Decimal>,
    max_amount: Option<Decimal>,
) -> usize {
    let before = records.len();
    records.retain(|tx| {
        let amount = tx.amount();
        min_amount.map_or(true, |min| amount > min) && max_amount.map_or(true, |max| amount <= max)
    });

    before - records.len()
}
