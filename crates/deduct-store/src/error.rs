use deduct_core::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to parse ground facts {path}")]
    Ground {
        path: String,
        #[source]
        source: ParseError,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
