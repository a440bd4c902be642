use crate::error::PipelineError;
use crate::transaction::Transaction;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Product metadata as published by the external catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductInfo {
    pub id: u32,
    pub title: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    products: Vec<ProductInfo>,
}

pub type ProductMapping = HashMap<u32, ProductInfo>;

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTransaction {
    pub transaction: Transaction,
    pub api_category: Option<String>,
    pub api_brand: Option<String>,
    pub api_rating: Option<f64>,
    pub api_match: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentStats {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub success_rate: Decimal,
    pub unmatched_products: Vec<String>,
}

const ENRICHED_HEADER: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "API_Category",
    "API_Brand",
    "API_Rating",
    "API_Match",
];

/// Flat output row, field order matching `ENRICHED_HEADER`.
#[derive(Serialize)]
struct EnrichedRow<'a> {
    transaction_id: &'a str,
    date: &'a str,
    product_id: &'a str,
    product_name: &'a str,
    quantity: i64,
    unit_price: Decimal,
    customer_id: &'a str,
    region: &'a str,
    api_category: Option<&'a str>,
    api_brand: Option<&'a str>,
    api_rating: Option<f64>,
    api_match: bool,
}

impl<'a> From<&'a EnrichedTransaction> for EnrichedRow<'a> {
    fn from(e: &'a EnrichedTransaction) -> Self {
        let tx = &e.transaction;
        Self {
            transaction_id: &tx.transaction_id,
            date: &tx.date,
            product_id: &tx.product_id,
            product_name: &tx.product_name,
            quantity: tx.quantity,
            unit_price: tx.unit_price,
            customer_id: &tx.customer_id,
            region: &tx.region,
            api_category: e.api_category.as_deref(),
            api_brand: e.api_brand.as_deref(),
            api_rating: e.api_rating,
            api_match: e.api_match,
        }
    }
}

pub fn parse_catalog(json: &str) -> Result<Vec<ProductInfo>, PipelineError> {
    let document: CatalogDocument = serde_json::from_str(json)?;
    Ok(document.products)
}

pub async fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<ProductInfo>, PipelineError> {
    let json = tokio::fs::read_to_string(path.as_ref()).await?;
    let products = parse_catalog(&json)?;
    info!(count = products.len(), "Loaded product catalog");
    Ok(products)
}

pub fn create_product_mapping(products: Vec<ProductInfo>) -> ProductMapping {
    products.into_iter().map(|p| (p.id, p)).collect()
}

/// `"P101"` maps to `101`. Every non-digit is dropped before parsing.
pub fn extract_product_number(product_id: &str) -> Option<u32> {
    let digits: String = product_id.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

pub fn enrich_transactions(
    records: &[Transaction],
    mapping: &ProductMapping,
) -> Vec<EnrichedTransaction> {
    records
        .iter()
        .map(|tx| {
            let info = extract_product_number(&tx.product_id).and_then(|id| mapping.get(&id));
            if info.is_none() {
                warn!(product_id = %tx.product_id, "No catalog entry for product");
            }

            EnrichedTransaction {
                transaction: tx.clone(),
                api_category: info.and_then(|i| i.category.clone()),
                api_brand: info.and_then(|i| i.brand.clone()),
                api_rating: info.and_then(|i| i.rating),
                api_match: info.is_some(),
            }
        })
        .collect()
}

pub fn enrichment_stats(enriched: &[EnrichedTransaction]) -> EnrichmentStats {
    let total = enriched.len();
    let matched = enriched.iter().filter(|e| e.api_match).count();

    let mut seen = HashSet::new();
    let unmatched_products = enriched
        .iter()
        .filter(|e| !e.api_match)
        .map(|e| e.transaction.product_id.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect();

    let success_rate = if total == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(matched) / Decimal::from(total) * Decimal::ONE_HUNDRED).round_dp(2)
    };

    EnrichmentStats {
        total,
        matched,
        unmatched: total - matched,
        success_rate,
        unmatched_products,
    }
}

pub fn write_enriched<W: Write>(
    writer: W,
    enriched: &[EnrichedTransaction],
) -> Result<(), PipelineError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(ENRICHED_HEADER)?;
    for e in enriched {
        wtr.serialize(EnrichedRow::from(e))?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn save_enriched<P: AsRef<Path>>(
    path: P,
    enriched: &[EnrichedTransaction],
) -> Result<(), PipelineError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_enriched(std::fs::File::create(path)?, enriched)?;
    info!(path = %path.display(), rows = enriched.len(), "Wrote enriched transactions");
    Ok(())
}
