//! Financial Modeling Prep: general market news, company profiles and the
//! stock screener.

use mpulse_core::{NewsArticle, NewsSource, StockListing, Ticker};
use serde::Deserialize;

use super::{article, encode_segment, ListPayload};
use crate::client::NewsClient;
use crate::dates::parse_loose_date;
use crate::error::ScraperError;

/// Market-cap floor for the Indian listing screen, in INR.
const INDIAN_MARKET_CAP_FLOOR: &str = "10000000000";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpNewsItem {
    title: Option<String>,
    url: Option<String>,
    published_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpProfile {
    company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpScreenerItem {
    symbol: Option<String>,
    company_name: Option<String>,
}

fn items<T>(payload: ListPayload<T>) -> Result<Vec<T>, ScraperError> {
    match payload {
        ListPayload::Items(items) => Ok(items),
        ListPayload::Error(e) => Err(ScraperError::Provider {
            provider: NewsSource::Fmp,
            message: e.error,
        }),
    }
}

/// Latest general market news. FMP does not filter this feed by ticker or date.
pub(crate) async fn fetch_news(client: &NewsClient) -> Result<Vec<NewsArticle>, ScraperError> {
    let key = client.require_key(NewsSource::Fmp)?;
    let url = NewsClient::build_url(
        &client.endpoints().fmp,
        "api/v3/news",
        &[("limit", "50"), ("apikey", key)],
    )?;

    let payload: ListPayload<FmpNewsItem> = client
        .send_json(NewsSource::Fmp, "fmp news", |http| http.get(url.clone()))
        .await?;

    Ok(items(payload)?
        .into_iter()
        .filter_map(|item| {
            let published_at = item.published_date.as_deref().and_then(parse_loose_date);
            article(item.title, item.url, published_at, NewsSource::Fmp)
        })
        .collect())
}

/// Registered company name with the ` Inc.` and ` Ltd.` suffixes removed.
pub(crate) async fn company_name(
    client: &NewsClient,
    ticker: &Ticker,
) -> Result<Option<String>, ScraperError> {
    let key = client.require_key(NewsSource::Fmp)?;
    let path = format!("api/v3/profile/{}", encode_segment(ticker.as_str()));
    let url = NewsClient::build_url(&client.endpoints().fmp, &path, &[("apikey", key)])?;

    let payload: ListPayload<FmpProfile> = client
        .send_json(NewsSource::Fmp, "fmp profile", |http| http.get(url.clone()))
        .await?;

    Ok(items(payload)?
        .into_iter()
        .next()
        .and_then(|profile| profile.company_name)
        .map(|name| strip_legal_suffix(&name))
        .filter(|name| !name.is_empty()))
}

pub(crate) async fn indian_stocks(client: &NewsClient) -> Result<Vec<StockListing>, ScraperError> {
    let key = client.require_key(NewsSource::Fmp)?;
    let url = NewsClient::build_url(
        &client.endpoints().fmp,
        "api/v3/stock-screener",
        &[
            ("marketCapMoreThan", INDIAN_MARKET_CAP_FLOOR),
            ("country", "IN"),
            ("limit", "50"),
            ("apikey", key),
        ],
    )?;

    let payload: ListPayload<FmpScreenerItem> = client
        .send_json(NewsSource::Fmp, "fmp stock screener", |http| {
            http.get(url.clone())
        })
        .await?;

    let listings: Vec<StockListing> = items(payload)?
        .into_iter()
        .filter_map(|item| match (item.symbol, item.company_name) {
            (Some(symbol), Some(name)) if !symbol.trim().is_empty() => Some(StockListing {
                symbol: symbol.trim().to_string(),
                name: name.trim().to_string(),
            }),
            _ => None,
        })
        .collect();

    tracing::info!(count = listings.len(), "fetched Indian stock listings");
    Ok(listings)
}

fn strip_legal_suffix(name: &str) -> String {
    name.replace(" Inc.", "").replace(" Ltd.", "").trim().to_string()
}
