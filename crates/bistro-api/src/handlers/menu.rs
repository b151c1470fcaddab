//! Menu and review handlers

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use bistro_core::{DeleteResult, InsertResult, MenuItem, RecordId, Review};
use tracing::{info, instrument};

pub async fn list_menu(State(state): State<AppState>) -> ApiResult<Json<Vec<MenuItem>>> {
    Ok(Json(state.store.list_menu().await?))
}

/// Add a dish. Any client-supplied id is ignored.
#[instrument(skip_all, fields(name = %item.name, category = %item.category))]
pub async fn add_menu_item(
    State(state): State<AppState>,
    Json(mut item): Json<MenuItem>,
) -> ApiResult<Json<InsertResult>> {
    item.id = None;
    let ack = state.store.insert_menu_item(item).await?;
    info!("Added menu item {}", ack.inserted_id);
    Ok(Json(ack))
}

#[instrument(skip(state))]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    let id = RecordId::parse(&id)?;
    Ok(Json(state.store.delete_menu_item(&id).await?))
}

pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<Review>>> {
    Ok(Json(state.store.list_reviews().await?))
}
