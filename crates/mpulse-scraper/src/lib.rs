//! News source adapters for Market Pulse.
//!
//! [`NewsClient`] owns the HTTP client, provider keys and retry policy, and
//! dispatches on [`mpulse_core::NewsSource`] to one adapter per provider.

pub mod client;
pub mod dates;
pub mod error;
pub(crate) mod retry;
pub(crate) mod sources;

pub use client::{Endpoints, NewsClient};
pub use dates::{date_from_unix, parse_loose_date};
pub use error::ScraperError;
pub use sources::cnbctv18::parse_news_page as parse_cnbctv18_page;
pub use sources::yahoo::parse_quote_page as parse_yahoo_page;
