use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImporterError>;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("Cache error: {0}")]
    CacheError(#[from] redis::RedisError),

    #[error("API returned status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Missing or invalid rate-limit header: {0}")]
    RateLimitHeader(String),

    #[error("Data transformation error: {0}")]
    TransformationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
