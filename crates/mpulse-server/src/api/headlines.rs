use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use mpulse_core::SentimentLabel;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, parse_ticker, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct HeadlineItem {
    pub headline: String,
    pub source_url: String,
    pub source: Option<String>,
    pub published_at: Option<NaiveDate>,
    pub sentiment_score: f64,
    pub sentiment: SentimentLabel,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct TickerResults {
    pub ticker: String,
    pub results: Vec<HeadlineItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct DailySentimentItem {
    pub date: NaiveDate,
    pub avg_sentiment: f64,
    pub sentiment: SentimentLabel,
}

#[derive(Debug, Serialize)]
pub(super) struct DailySentiment {
    pub ticker: String,
    pub days: Vec<DailySentimentItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResultsQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_ticker): Path<String>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<ApiResponse<TickerResults>>, ApiError> {
    let ticker = parse_ticker(&req_id.0, &raw_ticker)?;
    let rows = mpulse_db::get_headlines(&state.pool, &ticker, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let results = rows
        .into_iter()
        .map(|row| HeadlineItem {
            sentiment: SentimentLabel::from_score(row.sentiment_score),
            headline: row.headline,
            source_url: row.source_url,
            source: row.source,
            published_at: row.published_at,
            sentiment_score: row.sentiment_score,
            scraped_at: row.scraped_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(
        TickerResults {
            ticker: ticker.to_string(),
            results,
        },
        req_id.0,
    )))
}

pub(super) async fn daily_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_ticker): Path<String>,
) -> Result<Json<ApiResponse<DailySentiment>>, ApiError> {
    let ticker = parse_ticker(&req_id.0, &raw_ticker)?;
    let rows = mpulse_db::get_sentiment_over_time(&state.pool, &ticker)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let days = rows
        .into_iter()
        .map(|row| DailySentimentItem {
            date: row.day,
            avg_sentiment: row.avg_sentiment,
            sentiment: SentimentLabel::from_score(row.avg_sentiment),
        })
        .collect();

    Ok(Json(ApiResponse::new(
        DailySentiment {
            ticker: ticker.to_string(),
            days,
        },
        req_id.0,
    )))
}
