// Core structs: PriceDocument, PricePair, error types
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One scraped price observation. Stored as-is, one document per `product_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceDocument {
    pub product_name: String,
    pub date: NaiveDate,
    pub original_price: String,
    pub sale_price: String,
}

/// Original and sale price as they appear on the page, currency symbol removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePair {
    pub original_price: String,
    pub sale_price: String,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("http error: {0}")]
    HttpError(String),
    #[error("unexpected status {0}")]
    InvalidResponse(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("html parse error: {0}")]
    HtmlParseError(String),
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("product is not on sale")]
    NotOnSale,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("seed document {0} not found")]
    SeedNotFound(String),
    #[error("seed document is missing field {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Conditions that stop a run before or instead of processing any product.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to connect to store: {0}")]
    Connect(#[source] StoreError),
    #[error("failed to load product urls: {0}")]
    Seed(#[source] StoreError),
    #[error("failed to build http client: {0}")]
    Client(#[source] ScraperError),
}
