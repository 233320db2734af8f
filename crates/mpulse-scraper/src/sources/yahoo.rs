//! Yahoo Finance quote pages, scraped from the server-rendered HTML.

use std::collections::HashSet;
use std::sync::LazyLock;

use mpulse_core::{NewsArticle, NewsSource, Ticker};
use reqwest::Url;
use scraper::{Html, Selector};

use super::{article, collapse_whitespace, encode_segment};
use crate::client::NewsClient;
use crate::error::ScraperError;

static NEWS_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/news/"]"#).expect("valid selector"));
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("valid selector"));

pub(crate) async fn fetch(
    client: &NewsClient,
    ticker: &Ticker,
) -> Result<Vec<NewsArticle>, ScraperError> {
    let path = format!("quote/{}", encode_segment(ticker.as_str()));
    let url = NewsClient::build_url(&client.endpoints().yahoo, &path, &[])?;

    let html = client
        .send_text(NewsSource::Yahoo, |http| http.get(url.clone()))
        .await?;

    let articles = parse_quote_page(&html, &url);
    if articles.is_empty() {
        tracing::info!(ticker = %ticker, "no Yahoo Finance headlines found on quote page");
    }
    Ok(articles)
}

/// Extracts news links that carry an `h3` headline, first occurrence wins.
#[must_use]
pub fn parse_quote_page(html: &str, page_url: &Url) -> Vec<NewsArticle> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    document
        .select(&NEWS_LINK)
        .filter_map(|link| {
            let heading = link.select(&HEADING).next()?;
            let title = collapse_whitespace(&heading.text().collect::<String>());
            if title.is_empty() || !seen.insert(title.clone()) {
                return None;
            }
            let href = link.value().attr("href")?;
            let resolved = page_url.join(href).ok()?;
            article(Some(title), Some(resolved.to_string()), None, NewsSource::Yahoo)
        })
        .collect()
}
