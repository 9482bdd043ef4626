use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::encounter::encounter_routes;
use super::health::health_check;
use super::inventory::inventory_routes;
use super::progress::progress_routes;
use super::settings::settings_routes;
use super::state::AppState;
use super::today::today_routes;
use super::workout::workout_routes;

pub fn create_routes(state: AppState) -> Router {
    let cors = if state.config.is_development() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    let api = Router::new()
        .merge(today_routes())
        .merge(progress_routes())
        .merge(settings_routes())
        .nest("/workout", workout_routes())
        .nest("/encounter", encounter_routes())
        .nest("/inventory", inventory_routes())
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
