use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::models::{LockInOutcome, Reps, WorkoutLog};

#[derive(Debug, Deserialize)]
pub struct SaveWorkoutRequest {
    #[serde(default)]
    pub pushups: i64,
    #[serde(default)]
    pub situps: i64,
    #[serde(default)]
    pub squats: i64,
    #[serde(default)]
    pub pullups: i64,
}

#[derive(Debug, Serialize)]
pub struct LockInResponse {
    #[serde(flatten)]
    pub outcome: LockInOutcome,
    pub workout: WorkoutLog,
}

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(save_workout))
        .route("/minimum-set", post(apply_minimum_set))
        .route("/lock-in", post(lock_in))
        .route("/:date", get(get_workout))
}

pub async fn save_workout(
    State(state): State<AppState>,
    Json(request): Json<SaveWorkoutRequest>,
) -> Result<Json<WorkoutLog>, ApiError> {
    let today = state.players.today().await?;
    let reps = Reps::new(request.pushups, request.situps, request.squats, request.pullups);
    Ok(Json(state.workouts.save_reps(today, reps).await?))
}

pub async fn apply_minimum_set(State(state): State<AppState>) -> Result<Json<WorkoutLog>, ApiError> {
    let today = state.players.today().await?;
    Ok(Json(state.workouts.apply_minimum_set(today).await?))
}

pub async fn lock_in(State(state): State<AppState>) -> Result<Json<LockInResponse>, ApiError> {
    let today = state.players.today().await?;
    let outcome = state.workouts.lock_in(today).await?;
    let workout = state.workouts.get_log(today).await?;
    Ok(Json(LockInResponse { outcome, workout }))
}

pub async fn get_workout(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<WorkoutLog>, ApiError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date: {}", date)))?;

    state
        .workouts
        .find_log(date)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No workout logged for {}", date)))
}
