use crate::transaction::Transaction;

use rust_decimal::Decimal;
use tracing::debug;

pub const TRANSACTION_PREFIX: char = 'T';
pub const PRODUCT_PREFIX: char = 'P';
pub const CUSTOMER_PREFIX: char = 'C';

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub valid: Vec<Transaction>,
    pub total_input: usize,
    pub invalid_count: usize,
}

pub fn validate(records: Vec<Transaction>) -> ValidationOutcome {
    let total_input = records.len();

    let valid: Vec<Transaction> = records
        .into_iter()
        .filter(|tx| {
            let ok = is_valid(tx);
            if !ok {
                debug!(transaction_id = %tx.transaction_id, "Rejected transaction");
            }
            ok
        })
        .collect();

    ValidationOutcome {
        invalid_count: total_input - valid.len(),
        total_input,
        valid,
    }
}

/// Business rules a transaction must satisfy to enter analytics. The ID
/// prefixes are naming conventions of the source system, not typing.
pub fn is_valid(tx: &Transaction) -> bool {
    has_required_fields(tx) && has_positive_values(tx) && has_valid_prefixes(tx)
}

fn has_required_fields(tx: &Transaction) -> bool {
    !tx.customer_id.is_empty() && !tx.region.is_empty()
}

fn has_positive_values(tx: &Transaction) -> bool {
    tx.quantity > 0 && tx.unit_price > Decimal::ZERO
}

fn has_valid_prefixes(tx: &Transaction) -> bool {
    tx.transaction_id.starts_with(TRANSACTION_PREFIX)
        && tx.product_id.starts_with(PRODUCT_PREFIX)
        && tx.customer_id.starts_with(CUSTOMER_PREFIX)
}
