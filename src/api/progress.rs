use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::models::{DailySummary, ProgressSnapshot};

const DEFAULT_SUMMARY_LIMIT: i64 = 14;
const MAX_SUMMARY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub limit: Option<i64>,
}

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/progress", get(get_progress))
        .route("/summaries", get(list_summaries))
}

pub async fn get_progress(State(state): State<AppState>) -> Result<Json<ProgressSnapshot>, ApiError> {
    let today = state.players.today().await?;
    Ok(Json(state.summaries.progress_snapshot(today).await?))
}

pub async fn list_summaries(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Vec<DailySummary>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_SUMMARY_LIMIT);
    if !(1..=MAX_SUMMARY_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_SUMMARY_LIMIT
        )));
    }

    Ok(Json(state.summaries.list_recent(limit).await?))
}
