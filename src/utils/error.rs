// src/utils/error.rs
use thiserror::Error;

// Errors raised while fetching a page. These never reach the extractor;
// the crawl loop turns them into "Error" rows.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("Request blocked by server (403 Forbidden)")]
    Blocked,

    #[error("Page not found: {0}")]
    NotFound(String),
}

// Only produced inside the extractor's per-selector boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Malformed CSV: {0}")]
    CsvFormat(String),

    #[error("No results file found in {0}")]
    NoResultsFile(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Fetching failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
