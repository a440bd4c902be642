pub mod engine;
pub mod enrichment;
pub mod error;
pub mod report;
pub mod transaction;

use crate::error::PipelineError;
use crate::transaction::{CsvTransaction, Transaction};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{info, warn};

const FIELD_COUNT: usize = 8;

/// Reads the raw sales file as text, falling back to Latin-1 when the bytes
/// are not UTF-8.
pub fn read_sales_data<P: AsRef<Path>>(path: P) -> Result<String, PipelineError> {
    let bytes = std::fs::read(path.as_ref())?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(path = %path.as_ref().display(), "Input is not UTF-8, decoding as Latin-1");
            Ok(e.into_bytes().into_iter().map(char::from).collect())
        }
    }
}

/// Parses pipe-delimited sales rows. The header line is skipped, and rows
/// with the wrong field count or unparseable numbers are dropped.
pub fn parse_transactions(text: &str) -> Vec<Transaction> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let parsed: Vec<Transaction> = rdr
        .records()
        .filter_map(|result| {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable line: {}", e);
                    return None;
                }
            };

            if record.len() != FIELD_COUNT {
                warn!(fields = record.len(), "Skipping line with wrong field count");
                return None;
            }

            record
                .deserialize::<CsvTransaction>(None)
                .map_err(PipelineError::from)
                .and_then(Transaction::try_from)
                .map_err(|e| warn!("Skipping invalid line: {}", e))
                .ok()
        })
        .collect();

    info!(count = parsed.len(), "Parsed transactions");
    parsed
}

pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>, PipelineError> {
    let text = read_sales_data(path)?;
    Ok(parse_transactions(&text))
}
