use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

use super::{ApiError, AppState};
use crate::models::{CreateInventoryItem, InventoryItemView};

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(add_item))
        .route("/:item_id/equip", post(equip_item))
        .route("/:item_id/unequip", post(unequip_item))
}

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<InventoryItemView>>, ApiError> {
    let items = state.inventory.list_items().await?;
    Ok(Json(items.into_iter().map(InventoryItemView::from).collect()))
}

pub async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<CreateInventoryItem>,
) -> Result<(StatusCode, Json<InventoryItemView>), ApiError> {
    let item = state.inventory.add_item(request).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn equip_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<InventoryItemView>, ApiError> {
    Ok(Json(state.inventory.equip_item(item_id).await?.into()))
}

pub async fn unequip_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<InventoryItemView>, ApiError> {
    Ok(Json(state.inventory.unequip_item(item_id).await?.into()))
}
