//! Token issuance

use crate::auth::bearer_token;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use bistro_core::IdentityClaims;
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Sign a session token for the posted identity claims
#[instrument(skip_all, fields(email = %identity.email))]
pub async fn issue_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(identity): Json<IdentityClaims>,
) -> ApiResult<Json<TokenResponse>> {
    state.issuance.authorize(bearer_token(&headers))?;

    let token = state.tokens.issue(identity)?;
    info!("Issued session token");

    Ok(Json(TokenResponse { token }))
}
