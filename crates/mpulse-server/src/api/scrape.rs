use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{NaiveDate, Utc};
use mpulse_core::{DateRange, NewsSource, Ticker};
use mpulse_db::NewHeadline;
use mpulse_sentiment::analyze_articles;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{parse_ticker, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeRequest {
    pub ticker: String,
    pub source: String,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScrapeAccepted {
    pub job_id: Uuid,
    pub ticker: Ticker,
    pub source: NewsSource,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: &'static str,
}

/// Validates the request and starts a background fetch, analyze and store job.
pub(super) async fn start_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ScrapeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ScrapeAccepted>>), ApiError> {
    let validation = |message: String| ApiError::new(req_id.0.clone(), "validation_error", message);

    let ticker = parse_ticker(&req_id.0, &request.ticker)?;
    let source: NewsSource = request
        .source
        .parse()
        .map_err(|e: mpulse_core::CoreError| validation(e.to_string()))?;
    let range = DateRange::resolve(request.from_date, request.to_date, Utc::now().date_naive())
        .map_err(|e| validation(e.to_string()))?;
    if !state.news.has_credentials(source) {
        return Err(validation(format!("no API key configured for {source}")));
    }

    let job_id = Uuid::new_v4();
    tokio::spawn(run_scrape_job(state, job_id, ticker.clone(), source, range));

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            ScrapeAccepted {
                job_id,
                ticker,
                source,
                from_date: range.from(),
                to_date: range.to(),
                status: "accepted",
            },
            req_id.0,
        )),
    ))
}

/// Fetch, analyze and store one scrape. Failures are logged, never returned.
pub(super) async fn run_scrape_job(
    state: AppState,
    job_id: Uuid,
    ticker: Ticker,
    source: NewsSource,
    range: DateRange,
) {
    let articles = match state.news.fetch(source, &ticker, &range).await {
        Ok(articles) => articles,
        Err(e) => {
            tracing::warn!(
                %job_id,
                ticker = %ticker,
                source = %source,
                error = %e,
                "scrape job failed"
            );
            return;
        }
    };

    let report = analyze_articles(&state.scorer, articles).await;
    let batch: Vec<NewHeadline<'_>> = report
        .headlines
        .iter()
        .map(|h| NewHeadline {
            ticker: &ticker,
            article: &h.article,
            sentiment_score: h.score,
        })
        .collect();

    match mpulse_db::add_headlines(&state.pool, &batch).await {
        Ok(written) => tracing::info!(
            %job_id,
            ticker = %ticker,
            source = %source,
            fetched = report.fetched,
            written,
            "scrape job complete"
        ),
        Err(e) => tracing::error!(
            %job_id,
            ticker = %ticker,
            error = %e,
            "failed to store headlines"
        ),
    }
}
