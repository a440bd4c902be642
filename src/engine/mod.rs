pub mod analytics;
pub mod filter;
pub mod validator;


use crate::engine::filter::{apply_amount_filter, apply_region_filter, FilterCriteria, FilterSummary};
use crate::engine::validator::validate;
use crate::transaction::Transaction;

use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedData {
    pub transactions: Vec<Transaction>,
    pub summary: FilterSummary,
}

/// Validation, then region filter, then amount filter.
pub fn clean_transactions(records: Vec<Transaction>, criteria: &FilterCriteria) -> CleanedData {
    let outcome = validate(records);
    info!(
        total = outcome.total_input,
        invalid = outcome.invalid_count,
        "Validated transactions"
    );

    let mut transactions = outcome.valid;
    let filtered_by_region = apply_region_filter(&mut transactions, criteria.region.as_deref());
    let filtered_by_amount =
        apply_amount_filter(&mut transactions, criteria.min_amount, criteria.max_amount);

    let summary = FilterSummary {
        total_input: outcome.total_input,
        invalid_removed: outcome.invalid_count,
        filtered_by_region,
        filtered_by_amount,
        final_count: transactions.len(),
    };
    info!(
        by_region = filtered_by_region,
        by_amount = filtered_by_amount,
        remaining = summary.final_count,
        "Applied filters"
    );

    CleanedData {
        transactions,
        summary,
    }
}
