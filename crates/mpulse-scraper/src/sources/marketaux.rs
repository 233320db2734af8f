//! MarketAux entity-tagged news.

use mpulse_core::{NewsArticle, NewsSource, Ticker};
use serde::Deserialize;

use super::article;
use crate::client::NewsClient;
use crate::dates::parse_loose_date;
use crate::error::ScraperError;

#[derive(Debug, Deserialize)]
struct MarketauxResponse {
    #[serde(default)]
    data: Vec<MarketauxItem>,
    error: Option<MarketauxError>,
}

#[derive(Debug, Deserialize)]
struct MarketauxItem {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketauxError {
    message: String,
}

pub(crate) async fn fetch(
    client: &NewsClient,
    ticker: &Ticker,
) -> Result<Vec<NewsArticle>, ScraperError> {
    let key = client.require_key(NewsSource::Marketaux)?;
    let url = NewsClient::build_url(
        &client.endpoints().marketaux,
        "v1/news/all",
        &[
            ("api_token", key),
            ("symbols", ticker.as_str()),
            ("language", "en"),
            ("limit", "50"),
        ],
    )?;

    let response: MarketauxResponse = client
        .send_json(NewsSource::Marketaux, "marketaux news", |http| {
            http.get(url.clone())
        })
        .await?;

    if let Some(error) = response.error {
        return Err(ScraperError::Provider {
            provider: NewsSource::Marketaux,
            message: error.message,
        });
    }

    Ok(response
        .data
        .into_iter()
        .filter_map(|item| {
            let published_at = item.published_at.as_deref().and_then(parse_loose_date);
            article(item.title, item.url, published_at, NewsSource::Marketaux)
        })
        .collect())
}
