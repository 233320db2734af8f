use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::CoreError;

const MAX_TICKER_LEN: usize = 20;

/// An exchange ticker symbol, trimmed and upper-cased.
///
/// Accepts ASCII alphanumerics plus `.`, `-`, `&` and `^` so that symbols
/// such as `BRK.B`, `M&M` and `^NSEI` survive normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Normalize and validate a raw ticker string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTicker`] when the input is empty, too long,
    /// or contains characters outside the accepted set.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let normalized = raw.trim().to_uppercase();
        let valid_chars = normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '&' | '^'));

        if normalized.is_empty() || normalized.len() > MAX_TICKER_LEN || !valid_chars {
            return Err(CoreError::InvalidTicker(raw.to_string()));
        }

        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form, used in URL paths of sites that key pages that way.
    #[must_use]
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Ticker {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

/// Inclusive publication-date window passed to every source adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDateRange`] if `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, CoreError> {
        if from > to {
            return Err(CoreError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// The `days`-long window ending on `today`.
    #[must_use]
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let from = today - Duration::days(i64::from(days));
        Self { from, to: today }
    }

    /// Resolve optional CLI/API bounds against a default 30-day window.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDateRange`] if the resolved bounds are inverted.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        let default = Self::last_days(today, 30);
        Self::new(from.unwrap_or(default.from), to.unwrap_or(default.to))
    }

    #[must_use]
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    #[must_use]
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// `from` formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    /// `to` formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}
