use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// External provider a headline was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsSource {
    /// Google News results through the Serper API.
    Google,
    NewsApi,
    Fmp,
    Cnbctv18,
    Finnhub,
    Marketaux,
    Yahoo,
}

impl NewsSource {
    pub const ALL: [NewsSource; 7] = [
        NewsSource::NewsApi,
        NewsSource::Google,
        NewsSource::Marketaux,
        NewsSource::Finnhub,
        NewsSource::Fmp,
        NewsSource::Cnbctv18,
        NewsSource::Yahoo,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NewsSource::Google => "google",
            NewsSource::NewsApi => "newsapi",
            NewsSource::Fmp => "fmp",
            NewsSource::Cnbctv18 => "cnbctv18",
            NewsSource::Finnhub => "finnhub",
            NewsSource::Marketaux => "marketaux",
            NewsSource::Yahoo => "yahoo",
        }
    }

    /// Whether the source honours the requested date range. The others
    /// return whatever the provider considers latest.
    #[must_use]
    pub fn supports_date_range(self) -> bool {
        matches!(self, NewsSource::NewsApi | NewsSource::Finnhub)
    }
}

impl std::fmt::Display for NewsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NewsSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        NewsSource::ALL
            .into_iter()
            .find(|source| source.as_str() == needle)
            .ok_or_else(|| CoreError::UnknownSource(s.to_string()))
    }
}

/// A headline as normalized by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    /// Publication day, when the provider reports one that parses.
    pub published_at: Option<NaiveDate>,
    pub source: NewsSource,
}

/// Bucketed reading of a compound sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    #[serde(rename = "Good News")]
    GoodNews,
    #[serde(rename = "Bad News")]
    BadNews,
    Neutral,
}

impl SentimentLabel {
    const THRESHOLD: f64 = 0.1;

    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > Self::THRESHOLD {
            SentimentLabel::GoodNews
        } else if score < -Self::THRESHOLD {
            SentimentLabel::BadNews
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::GoodNews => write!(f, "Good News"),
            SentimentLabel::BadNews => write!(f, "Bad News"),
            SentimentLabel::Neutral => write!(f, "Neutral"),
        }
    }
}

/// An exchange listing returned by the stock screener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockListing {
    pub symbol: String,
    pub name: String,
}
