use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },
}
