use crate::error::PipelineError;

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub customer_id: String,
    pub region: String,
}

/// One raw row of the pipe-delimited sales file, read positionally.
#[derive(Debug, Deserialize)]
pub struct CsvTransaction {
    pub transaction_id: String,
    pub date: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    pub customer_id: String,
    pub region: String,
}

impl TryFrom<CsvTransaction> for Transaction {
    type Error = PipelineError;

    fn try_from(csv: CsvTransaction) -> Result<Self, Self::Error> {
        let quantity = strip_separators(&csv.quantity)
            .parse::<i64>()
            .map_err(|e| PipelineError::InvalidRecord {
                message: format!(
                    "Bad quantity '{}' for transaction {}: {}",
                    csv.quantity, csv.transaction_id, e
                ),
            })?;

        let unit_price = Decimal::from_str(&strip_separators(&csv.unit_price)).map_err(|e| {
            PipelineError::InvalidRecord {
                message: format!(
                    "Bad unit price '{}' for transaction {}: {}",
                    csv.unit_price, csv.transaction_id, e
                ),
            }
        })?;

        if Decimal::from(quantity).checked_mul(unit_price).is_none() {
            return Err(PipelineError::InvalidRecord {
                message: format!(
                    "Amount overflows for transaction {}: {} x {}",
                    csv.transaction_id, quantity, unit_price
                ),
            });
        }

        // Commas inside a product name are text, not separators.
        let product_name = csv.product_name.replace(',', " ").trim().to_string();

        Ok(Transaction::new(
            csv.transaction_id,
            csv.date,
            csv.product_id,
            product_name,
            quantity,
            unit_price,
            csv.customer_id,
            csv.region,
        ))
    }
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_id: impl Into<String>,
        date: impl Into<String>,
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: Decimal,
        customer_id: impl Into<String>,
        region: impl AsRef<str>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            date: date.into(),
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
            customer_id: customer_id.into(),
            region: normalize_region(region.as_ref()),
        }
    }

    /// Always recomputed from quantity and unit price. Saturates at the
    /// `Decimal` bounds; parsed rows never reach them.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }
}

/// Title-cases a region name: `"north EAST"` becomes `"North East"`.
pub fn normalize_region(region: &str) -> String {
    region
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_separators(raw: &str) -> String {
    raw.replace(',', "")
}
