//! Finnhub company news, filtered server-side by symbol and date range.

use mpulse_core::{DateRange, NewsArticle, NewsSource, Ticker};
use serde::Deserialize;

use super::{article, ListPayload};
use crate::client::NewsClient;
use crate::dates::date_from_unix;
use crate::error::ScraperError;

#[derive(Debug, Deserialize)]
struct FinnhubItem {
    headline: Option<String>,
    url: Option<String>,
    /// Unix seconds.
    datetime: Option<i64>,
}

pub(crate) async fn fetch(
    client: &NewsClient,
    ticker: &Ticker,
    range: &DateRange,
) -> Result<Vec<NewsArticle>, ScraperError> {
    let key = client.require_key(NewsSource::Finnhub)?;
    let from = range.from_param();
    let to = range.to_param();
    let url = NewsClient::build_url(
        &client.endpoints().finnhub,
        "api/v1/company-news",
        &[
            ("symbol", ticker.as_str()),
            ("from", &from),
            ("to", &to),
            ("token", key),
        ],
    )?;

    let payload: ListPayload<FinnhubItem> = client
        .send_json(NewsSource::Finnhub, "finnhub company news", |http| {
            http.get(url.clone())
        })
        .await?;

    let items = match payload {
        ListPayload::Items(items) => items,
        ListPayload::Error(e) => {
            return Err(ScraperError::Provider {
                provider: NewsSource::Finnhub,
                message: e.error,
            })
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let published_at = item.datetime.and_then(date_from_unix);
            article(item.headline, item.url, published_at, NewsSource::Finnhub)
        })
        .collect())
}
