//! Cart handlers

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use bistro_core::{CartItem, DeleteResult, InsertResult, RecordId};
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub email: String,
}

#[instrument(skip_all, fields(email = %item.email))]
pub async fn add_cart_item(
    State(state): State<AppState>,
    Json(mut item): Json<CartItem>,
) -> ApiResult<Json<InsertResult>> {
    item.id = None;
    Ok(Json(state.store.insert_cart_item(item).await?))
}

/// Cart items of the caller; the middleware has already matched `email`
/// against the token.
pub async fn list_carts(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> ApiResult<Json<Vec<CartItem>>> {
    Ok(Json(state.store.carts_for_email(&query.email).await?))
}

#[instrument(skip(state))]
pub async fn delete_cart_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    let id = RecordId::parse(&id)?;
    Ok(Json(state.store.delete_cart_item(&id).await?))
}
