use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::models::{CombatAction, DailyRoll, EncounterResult};
use crate::services::GameError;

#[derive(Debug, Deserialize)]
pub struct ManualActionRequest {
    pub action: String,
}

pub fn encounter_routes() -> Router<AppState> {
    Router::new()
        .route("/auto", post(auto_resolve))
        .route("/manual", post(manual_action))
        .route("/reroll", post(reroll))
}

pub async fn auto_resolve(State(state): State<AppState>) -> Result<Json<EncounterResult>, ApiError> {
    let today = state.players.today().await?;
    Ok(Json(state.encounters.resolve(today, CombatAction::Auto).await?))
}

/// One round of `strike` or `guard`
pub async fn manual_action(
    State(state): State<AppState>,
    Json(request): Json<ManualActionRequest>,
) -> Result<Json<EncounterResult>, ApiError> {
    let action = match request.action.parse::<CombatAction>() {
        Ok(action @ (CombatAction::Strike | CombatAction::Guard)) => action,
        _ => {
            return Err(GameError::InvalidAction(format!(
                "Unknown action {:?}, expected strike or guard",
                request.action
            ))
            .into())
        }
    };

    let today = state.players.today().await?;
    Ok(Json(state.encounters.resolve(today, action).await?))
}

pub async fn reroll(State(state): State<AppState>) -> Result<Json<DailyRoll>, ApiError> {
    let today = state.players.today().await?;
    Ok(Json(state.encounters.reroll(today).await?))
}
