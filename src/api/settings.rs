use axum::{extract::State, response::Json, routing::get, Router};

use super::{ApiError, AppState};
use crate::models::{SettingsView, UpdateSettings};

pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings).put(update_settings))
        .route("/theme-packs", get(list_theme_packs))
}

async fn settings_view(state: &AppState) -> Result<SettingsView, ApiError> {
    let player = state.players.get_player().await?;
    let timezone = state.players.timezone_for(&player).name().to_string();
    Ok(SettingsView::new(&player, timezone, state.theme_packs.list()))
}

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<SettingsView>, ApiError> {
    Ok(Json(settings_view(&state).await?))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettings>,
) -> Result<Json<SettingsView>, ApiError> {
    state.players.update_settings(request).await?;
    Ok(Json(settings_view(&state).await?))
}

pub async fn list_theme_packs(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.theme_packs.list()))
}
