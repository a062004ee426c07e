// Error types for row sources, configuration and report assembly.

use thiserror::Error;

/// Failure to obtain rows for a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query `{query}` failed: {message}")]
    Execution { query: String, message: String },

    #[error("no data available for query `{0}`")]
    Unavailable(String),

    #[error("snapshot read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidOverride { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("query error: {0}")]
    Query(#[from] QueryError),
}

/// Result type alias for report operations.
pub type ReportResult<T> = Result<T, ReportError>;
