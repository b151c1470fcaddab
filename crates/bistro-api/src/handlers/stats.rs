//! Dashboard handlers

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{extract::State, Json};
use bistro_core::{AdminStats, CategoryStats};

pub async fn admin_stats(State(state): State<AppState>) -> ApiResult<Json<AdminStats>> {
    Ok(Json(state.store.admin_stats().await?))
}

/// Orders and revenue per menu category
pub async fn order_stats(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryStats>>> {
    Ok(Json(state.store.order_stats().await?))
}
