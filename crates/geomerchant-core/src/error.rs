//! Error types for geomerchant

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Place search error: {0}")]
    PlaceSearch(String),

    /// A token reached the tagger without being counted first.
    /// Callers must run the frequency update over the whole batch before tagging.
    #[error("Token '{0}' has never been observed by the frequency aggregator")]
    UnknownToken(String),

    /// Candidates exist but there is nowhere to measure them from.
    #[error("No visited locations recorded for {0}")]
    NoVisitedLocations(NaiveDate),
}

pub type Result<T> = std::result::Result<T, Error>;
