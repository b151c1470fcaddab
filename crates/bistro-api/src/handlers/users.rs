//! User handlers

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use bistro_core::{BistroError, NewUser, RecordId, Role, UpdateResult, User, UserInsert};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AdminCheckResponse {
    pub admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    #[serde(default)]
    pub role: String,
}

/// List all users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.store.list_users().await?))
}

/// Register a user on first sign-in. An existing email is not an error.
#[instrument(skip_all, fields(email = %new_user.email))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> ApiResult<Response> {
    if new_user.email.trim().is_empty() {
        return Err(BistroError::InvalidRequest("email is required".to_string()).into());
    }

    match state.store.insert_user(User::from(new_user)).await? {
        UserInsert::Inserted(ack) => {
            info!("Registered user {}", ack.inserted_id);
            Ok(Json(ack).into_response())
        }
        UserInsert::AlreadyExists => Ok(Json(MessageResponse {
            message: "user exist already".to_string(),
        })
        .into_response()),
    }
}

/// Whether the stored user for `email` has the admin role
pub async fn admin_check(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<AdminCheckResponse>> {
    let admin = state
        .store
        .find_user_by_email(&email)
        .await?
        .is_some_and(|user| user.is_admin());

    Ok(Json(AdminCheckResponse { admin }))
}

/// Assign or clear a user's role
#[instrument(skip(state))]
pub async fn set_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<Json<UpdateResult>> {
    let id = RecordId::parse(&id)?;
    let role = Role::parse_assignment(&query.role)?;

    let ack = state.store.set_user_role(&id, role).await?;
    info!(
        "Role of user {} set to {}",
        id,
        role.map(|r| r.as_str()).unwrap_or("none")
    );

    Ok(Json(ack))
}
