use axum::{
    extract::{Path, State},
    Extension, Json,
};
use mpulse_core::SentimentLabel;
use mpulse_sentiment::headline_digest;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, parse_ticker, ApiError, ApiResponse, AppState};

/// Most recent stored headlines fed to the summarizer.
const SUMMARY_HEADLINE_LIMIT: i64 = 50;

#[derive(Debug, Serialize)]
pub(super) struct TickerSummary {
    pub ticker: String,
    pub headline_count: usize,
    pub average_sentiment: Option<f64>,
    pub sentiment: Option<SentimentLabel>,
    pub summary: String,
}

pub(super) async fn ticker_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_ticker): Path<String>,
) -> Result<Json<ApiResponse<TickerSummary>>, ApiError> {
    let ticker = parse_ticker(&req_id.0, &raw_ticker)?;
    let rows = mpulse_db::get_headlines(&state.pool, &ticker, SUMMARY_HEADLINE_LIMIT)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let headlines: Vec<&str> = rows.iter().map(|r| r.headline.as_str()).collect();
    let summary = state
        .summarizer
        .summarize(&headline_digest(&headlines))
        .await
        .map_err(|e| {
            tracing::warn!(ticker = %ticker, error = %e, "summarization failed");
            ApiError::new(req_id.0.clone(), "upstream_error", "summarization failed")
        })?;

    #[allow(clippy::cast_precision_loss)]
    let average_sentiment = (!rows.is_empty())
        .then(|| rows.iter().map(|r| r.sentiment_score).sum::<f64>() / rows.len() as f64);

    Ok(Json(ApiResponse::new(
        TickerSummary {
            ticker: ticker.to_string(),
            headline_count: rows.len(),
            average_sentiment,
            sentiment: average_sentiment.map(SentimentLabel::from_score),
            summary,
        },
        req_id.0,
    )))
}
