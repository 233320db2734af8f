//! NewsAPI `everything` search, widened with the company name when FMP knows it.

use mpulse_core::{DateRange, NewsArticle, NewsSource, Ticker};
use serde::Deserialize;

use super::{article, fmp};
use crate::client::NewsClient;
use crate::dates::parse_loose_date;
use crate::error::ScraperError;

/// NewsAPI rejects some browser user agents on the free tier; this one passes.
const NEWSAPI_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

pub(crate) async fn fetch(
    client: &NewsClient,
    ticker: &Ticker,
    range: &DateRange,
) -> Result<Vec<NewsArticle>, ScraperError> {
    let key = client.require_key(NewsSource::NewsApi)?;
    let query = search_query(ticker, resolve_company_name(client, ticker).await.as_deref());
    let from = range.from_param();
    let to = range.to_param();
    let url = NewsClient::build_url(
        &client.endpoints().newsapi,
        "v2/everything",
        &[
            ("q", &query),
            ("from", &from),
            ("to", &to),
            ("language", "en"),
            ("sortBy", "relevancy"),
            ("apiKey", key),
        ],
    )?;

    let response: NewsApiResponse = client
        .send_json(NewsSource::NewsApi, "newsapi everything", |http| {
            http.get(url.clone())
                .header(reqwest::header::USER_AGENT, NEWSAPI_USER_AGENT)
        })
        .await?;

    if response.status != "ok" {
        return Err(ScraperError::Provider {
            provider: NewsSource::NewsApi,
            message: response
                .message
                .unwrap_or_else(|| format!("status \"{}\"", response.status)),
        });
    }

    Ok(response
        .articles
        .into_iter()
        .filter_map(|item| {
            let published_at = item.published_at.as_deref().and_then(parse_loose_date);
            article(item.title, item.url, published_at, NewsSource::NewsApi)
        })
        .collect())
}

/// Company name for the query, or `None` when FMP is unavailable.
async fn resolve_company_name(client: &NewsClient, ticker: &Ticker) -> Option<String> {
    if client.api_key(NewsSource::Fmp).is_none() {
        tracing::debug!(ticker = %ticker, "no FMP key; searching NewsAPI by ticker only");
        return None;
    }
    match fmp::company_name(client, ticker).await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(ticker = %ticker, error = %e, "company name lookup failed");
            None
        }
    }
}

fn search_query(ticker: &Ticker, company: Option<&str>) -> String {
    match company {
        Some(name) => format!("\"{ticker}\" OR \"{name}\""),
        None => ticker.to_string(),
    }
}
