//! Google News results through the Serper search API.

use mpulse_core::{NewsArticle, NewsSource, Ticker};
use serde::{Deserialize, Serialize};

use super::article;
use crate::client::NewsClient;
use crate::error::ScraperError;

#[derive(Serialize)]
struct SerperQuery<'a> {
    q: &'a str,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    news: Vec<SerperItem>,
}

#[derive(Debug, Deserialize)]
struct SerperItem {
    title: Option<String>,
    link: Option<String>,
}

pub(crate) async fn fetch(
    client: &NewsClient,
    ticker: &Ticker,
) -> Result<Vec<NewsArticle>, ScraperError> {
    let key = client.require_key(NewsSource::Google)?;
    let url = NewsClient::build_url(&client.endpoints().serper, "news", &[])?;
    let query = format!("{ticker} stock news");

    let response: SerperResponse = client
        .send_json(NewsSource::Google, "serper news", |http| {
            http.post(url.clone())
                .header("X-API-KEY", key)
                .json(&SerperQuery { q: &query })
        })
        .await?;

    Ok(response
        .news
        .into_iter()
        .filter_map(|item| article(item.title, item.link, None, NewsSource::Google))
        .collect())
}
