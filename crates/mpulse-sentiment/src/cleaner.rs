//! Relevance filter applied to scraped headlines before scoring.

use std::sync::LazyLock;

use mpulse_core::NewsArticle;
use regex::Regex;

/// Headlines containing any of these (case-insensitive substring) are dropped.
pub const IRRELEVANT_KEYWORDS: &[&str] = &[
    "market report",
    "zodiac sign",
    "horoscope",
    "recipe",
    "review",
    "how to",
    "guide",
    "top 10",
    "best deals",
    "sale",
    "discount",
    "astrology",
    "numerology",
    "sports",
    "cricket",
    "football",
    "fashion",
];

/// Shorter headlines carry too little signal to score.
pub const MIN_WORDS: usize = 4;

static IRRELEVANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = IRRELEVANT_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){alternation}")).expect("valid keyword regex")
});

/// Whether a headline survives the relevance filter.
#[must_use]
pub fn is_relevant(title: &str) -> bool {
    let title = title.trim();
    !title.is_empty()
        && title.split_whitespace().count() >= MIN_WORDS
        && !IRRELEVANT_RE.is_match(title)
}

/// Drops irrelevant and too-short headlines, preserving order.
#[must_use]
pub fn clean_headlines(articles: Vec<NewsArticle>) -> Vec<NewsArticle> {
    let total = articles.len();
    let kept: Vec<NewsArticle> = articles
        .into_iter()
        .filter(|a| is_relevant(&a.title))
        .collect();
    tracing::info!(kept = kept.len(), total, "kept {} of {} headlines", kept.len(), total);
    kept
}
