//! Shared domain types and configuration for Market Pulse.

pub mod app_config;
pub mod config;
pub mod news;
pub mod ticker;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, SentimentBackend, SourceKeys};
pub use config::{load_app_config, load_app_config_from_env};
pub use news::{NewsArticle, NewsSource, SentimentLabel, StockListing};
pub use ticker::{DateRange, Ticker};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid ticker \"{0}\"")]
    InvalidTicker(String),

    #[error("invalid date range: start date {from} cannot be after end date {to}")]
    InvalidDateRange {
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    },

    #[error("unknown news source \"{0}\"")]
    UnknownSource(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
