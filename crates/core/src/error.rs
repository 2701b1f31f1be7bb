//! Error types for r2catalog-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for r2catalog-core
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for r2catalog-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidConfig(String),

    /// R2 operation errors
    #[error("R2 operation failed: {0}")]
    R2Operation(String),

    /// The bucket exists and belongs to the caller
    #[error("Bucket already owned by you: {0}")]
    BucketAlreadyOwned(String),

    /// Reporting API answered with a non-success status
    #[error("Reporting API error: HTTP {status}: {message}")]
    ReportApi { status: u16, message: String },

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File could not be read
    #[error("Cannot read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file is not valid TOML
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout
    #[error("Operation timed out")]
    Timeout,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() {
            Error::Network(err.to_string())
        } else if err.is_request() {
            Error::HttpClient(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

// Generic SdkError conversion for all S3 operations
impl<E> From<aws_sdk_s3::error::SdkError<E>> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: aws_sdk_s3::error::SdkError<E>) -> Self {
        // Display on SdkError only prints the variant name; keep the whole chain.
        Error::R2Operation(aws_sdk_s3::error::DisplayErrorContext(&err).to_string())
    }
}
