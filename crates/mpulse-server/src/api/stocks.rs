use axum::{extract::State, Extension, Json};
use mpulse_core::StockListing;

use crate::middleware::RequestId;

use super::{map_scraper_error, ApiError, ApiResponse, AppState};

pub(super) async fn list_indian_stocks(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<StockListing>>>, ApiError> {
    let stocks = state
        .news
        .indian_stocks()
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(stocks, req_id.0)))
}
