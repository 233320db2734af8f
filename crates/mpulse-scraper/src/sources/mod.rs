//! One adapter per news provider. Each normalizes the provider payload into
//! [`NewsArticle`]s and drops records without a title or URL.

pub(crate) mod cnbctv18;
pub(crate) mod finnhub;
pub(crate) mod fmp;
pub(crate) mod marketaux;
pub(crate) mod newsapi;
pub(crate) mod serper;
pub(crate) mod yahoo;

use chrono::NaiveDate;
use mpulse_core::{NewsArticle, NewsSource};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

/// Path-segment escaping that leaves the ticker punctuation providers expect.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

pub(crate) fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

/// Builds an article from raw provider fields, or `None` if the title or URL
/// is missing or blank.
pub(crate) fn article(
    title: Option<String>,
    url: Option<String>,
    published_at: Option<NaiveDate>,
    source: NewsSource,
) -> Option<NewsArticle> {
    let title = collapse_whitespace(&title?);
    let url = url?.trim().to_string();
    if title.is_empty() || url.is_empty() {
        return None;
    }
    Some(NewsArticle {
        title,
        url,
        published_at,
        source,
    })
}

pub(crate) fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A JSON array of items, or the error object some providers send with a 200.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListPayload<T> {
    Items(Vec<T>),
    Error(ErrorPayload),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(alias = "Error Message", alias = "message")]
    pub(crate) error: String,
}
