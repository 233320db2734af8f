//! CNBC-TV18 stock news pages, scraped from HTML.

use std::sync::LazyLock;

use mpulse_core::{NewsArticle, NewsSource, Ticker};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::{article, collapse_whitespace, encode_segment};
use crate::client::NewsClient;
use crate::dates::parse_loose_date;
use crate::error::ScraperError;

static STORY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.listview-lead-stories li").expect("valid selector"));
static HEADLINE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2 a[href]").expect("valid selector"));
static LIST_TIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.list-time").expect("valid selector"));

pub(crate) async fn fetch(
    client: &NewsClient,
    ticker: &Ticker,
) -> Result<Vec<NewsArticle>, ScraperError> {
    let path = format!("market/stocks/{}/news/", encode_segment(&ticker.to_lowercase()));
    let url = NewsClient::build_url(&client.endpoints().cnbctv18, &path, &[])?;

    let html = match client
        .send_text(NewsSource::Cnbctv18, |http| http.get(url.clone()))
        .await
    {
        Ok(html) => html,
        Err(ScraperError::NotFound { url }) => {
            tracing::warn!(ticker = %ticker, %url, "no CNBC-TV18 page for ticker");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let articles = parse_news_page(&html, &url);
    if articles.is_empty() {
        tracing::info!(
            ticker = %ticker,
            "no CNBC-TV18 headlines found; page may be empty or its layout changed"
        );
    }
    Ok(articles)
}

/// Extracts headlines from a CNBC-TV18 stock news listing.
///
/// Relative links are resolved against `page_url`.
#[must_use]
pub fn parse_news_page(html: &str, page_url: &Url) -> Vec<NewsArticle> {
    let document = Html::parse_document(html);
    document
        .select(&STORY)
        .filter_map(|story| parse_story(story, page_url))
        .collect()
}

fn parse_story(story: ElementRef<'_>, page_url: &Url) -> Option<NewsArticle> {
    let link = story.select(&HEADLINE_LINK).next()?;
    let href = link.value().attr("href")?;
    let resolved = page_url.join(href).ok()?;
    let title: String = link.text().collect();
    let published_at = story
        .select(&LIST_TIME)
        .next()
        .map(|time| collapse_whitespace(&time.text().collect::<String>()))
        .and_then(|text| parse_loose_date(&text));

    article(
        Some(title),
        Some(resolved.to_string()),
        published_at,
        NewsSource::Cnbctv18,
    )
}
