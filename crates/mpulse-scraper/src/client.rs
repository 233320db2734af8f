use std::time::Duration;

use mpulse_core::{AppConfig, DateRange, NewsArticle, NewsSource, SourceKeys, StockListing, Ticker};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;
use crate::sources;

/// Base URLs of every provider. Overridden in tests to point at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub serper: String,
    pub newsapi: String,
    pub fmp: String,
    pub cnbctv18: String,
    pub finnhub: String,
    pub marketaux: String,
    pub yahoo: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            serper: "https://google.serper.dev".to_string(),
            newsapi: "https://newsapi.org".to_string(),
            fmp: "https://financialmodelingprep.com".to_string(),
            cnbctv18: "https://www.cnbctv18.com".to_string(),
            finnhub: "https://finnhub.io".to_string(),
            marketaux: "https://api.marketaux.com".to_string(),
            yahoo: "https://finance.yahoo.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Every provider served from one origin.
    #[must_use]
    pub fn single(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            serper: base.clone(),
            newsapi: base.clone(),
            fmp: base.clone(),
            cnbctv18: base.clone(),
            finnhub: base.clone(),
            marketaux: base.clone(),
            yahoo: base,
        }
    }
}

/// HTTP client shared by every news source adapter.
///
/// Non-2xx responses become typed errors: 429 is [`ScraperError::RateLimited`],
/// 404 is [`ScraperError::NotFound`], anything else is
/// [`ScraperError::UnexpectedStatus`]. Network failures, 429 and 5xx are
/// retried with exponential backoff up to `max_retries` additional attempts.
pub struct NewsClient {
    client: Client,
    keys: SourceKeys,
    endpoints: Endpoints,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl NewsClient {
    /// Creates a client with the given timeout, `User-Agent`, retry policy and keys.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
        keys: SourceKeys,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            keys,
            endpoints: Endpoints::default(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from the HTTP and source-key settings of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.http_timeout_secs,
            &config.http_user_agent,
            config.http_max_retries,
            config.http_backoff_base_ms,
            config.source_keys.clone(),
        )
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Whether `source` can be called with the configured keys. Scraped pages
    /// need none.
    #[must_use]
    pub fn has_credentials(&self, source: NewsSource) -> bool {
        self.api_key(source).is_some()
            || matches!(source, NewsSource::Cnbctv18 | NewsSource::Yahoo)
    }

    /// Fetches recent headlines for `ticker` from one source.
    ///
    /// Sources that cannot filter by date return their latest items and ignore
    /// `range`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingApiKey`] when the source needs a key that
    /// is not configured, or any transport or payload error from the provider.
    pub async fn fetch(
        &self,
        source: NewsSource,
        ticker: &Ticker,
        range: &DateRange,
    ) -> Result<Vec<NewsArticle>, ScraperError> {
        let articles = match source {
            NewsSource::Google => sources::serper::fetch(self, ticker).await?,
            NewsSource::NewsApi => sources::newsapi::fetch(self, ticker, range).await?,
            NewsSource::Fmp => sources::fmp::fetch_news(self).await?,
            NewsSource::Cnbctv18 => sources::cnbctv18::fetch(self, ticker).await?,
            NewsSource::Finnhub => sources::finnhub::fetch(self, ticker, range).await?,
            NewsSource::Marketaux => sources::marketaux::fetch(self, ticker).await?,
            NewsSource::Yahoo => sources::yahoo::fetch(self, ticker).await?,
        };
        tracing::info!(
            ticker = %ticker,
            source = %source,
            count = articles.len(),
            "fetched headlines"
        );
        Ok(articles)
    }

    /// Fetches every source in `sources` concurrently.
    ///
    /// One failing source does not abort the others; each result is returned
    /// alongside the source it came from, in input order.
    pub async fn fetch_many(
        &self,
        sources: &[NewsSource],
        ticker: &Ticker,
        range: &DateRange,
    ) -> Vec<(NewsSource, Result<Vec<NewsArticle>, ScraperError>)> {
        let calls = sources.iter().map(|&source| async move {
            (source, self.fetch(source, ticker, range).await)
        });
        futures::future::join_all(calls).await
    }

    /// Company name for `ticker` from the FMP profile endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingApiKey`] without an FMP key, or the
    /// provider error.
    pub async fn company_name(&self, ticker: &Ticker) -> Result<Option<String>, ScraperError> {
        sources::fmp::company_name(self, ticker).await
    }

    /// Large-cap Indian listings from the FMP stock screener.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingApiKey`] without an FMP key, or the
    /// provider error.
    pub async fn indian_stocks(&self) -> Result<Vec<StockListing>, ScraperError> {
        sources::fmp::indian_stocks(self).await
    }

    pub(crate) fn api_key(&self, source: NewsSource) -> Option<&str> {
        let key = match source {
            NewsSource::Google => &self.keys.serper_api_key,
            NewsSource::NewsApi => &self.keys.newsapi_api_key,
            NewsSource::Fmp => &self.keys.fmp_api_key,
            NewsSource::Finnhub => &self.keys.finnhub_api_key,
            NewsSource::Marketaux => &self.keys.marketaux_api_token,
            NewsSource::Cnbctv18 | NewsSource::Yahoo => return None,
        };
        key.as_deref()
    }

    pub(crate) fn require_key(&self, source: NewsSource) -> Result<&str, ScraperError> {
        self.api_key(source)
            .ok_or(ScraperError::MissingApiKey { provider: source })
    }

    /// Joins `path` onto `base` and appends `query` pairs, percent-encoded.
    pub(crate) fn build_url(
        base: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Url, ScraperError> {
        let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| ScraperError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Sends the request produced by `build` and returns the body text.
    ///
    /// `build` runs once per attempt so retries send a fresh request.
    pub(crate) async fn send_text<F>(
        &self,
        provider: NewsSource,
        build: F,
    ) -> Result<String, ScraperError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = build(&self.client);
            async move {
                let response = request.send().await.map_err(reqwest::Error::without_url)?;
                let status = response.status();
                let url = redact_query(response.url());

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        provider,
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                Ok(response.text().await.map_err(reqwest::Error::without_url)?)
            }
        })
        .await
    }

    /// Like [`Self::send_text`] but decodes the body as JSON.
    pub(crate) async fn send_json<T, F>(
        &self,
        provider: NewsSource,
        context: &str,
        build: F,
    ) -> Result<T, ScraperError>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let body = self.send_text(provider, build).await?;
        serde_json::from_str(&body).map_err(|source| ScraperError::Deserialize {
            context: context.to_string(),
            source,
        })
    }
}

/// URL without its query string. Keys passed as parameters must never reach
/// error messages or logs; transport errors drop their URL for the same reason.
fn redact_query(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
