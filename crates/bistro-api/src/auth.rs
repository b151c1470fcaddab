//! # Authorization Middleware
//!
//! One middleware evaluates the route's `Access` from the `AccessPolicy`
//! table. The token check always runs before the owner or admin check.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{MatchedPath, Query, RawPathParams, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    RequestExt,
};
use bistro_core::{Access, BistroError, IdentityClaims, ParamSource};
use std::collections::HashMap;
use tracing::debug;

/// Verified caller, available to handlers as `Extension<Caller>`
#[derive(Debug, Clone)]
pub struct Caller {
    pub claims: IdentityClaims,
}

impl Caller {
    pub fn email(&self) -> &str {
        &self.claims.email
    }
}

/// Second whitespace-separated part of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_whitespace()
        .nth(1)
}

/// Route-level access check
pub async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let access = state.policy.required(request.method().as_str(), &path);

    if !access.needs_token() {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers()).ok_or_else(BistroError::unauthorized)?;
    let claims = state.tokens.verify(token)?;
    let caller = Caller { claims };

    match access {
        Access::Owner { param, denial } => {
            let owner = owner_param(&mut request, param).await;
            if owner.as_deref() != Some(caller.email()) {
                debug!(path = %path, caller = %caller.email(), "Owner mismatch");
                return Err(BistroError::Forbidden(denial.to_string()).into());
            }
        }
        Access::Admin => require_admin(&state, caller.email()).await?,
        Access::Public | Access::Authenticated => {}
    }

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// The owning email a request names, if any
async fn owner_param(request: &mut Request, source: ParamSource) -> Option<String> {
    match source {
        ParamSource::Path(name) => {
            let params = request.extract_parts::<RawPathParams>().await.ok()?;
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
        ParamSource::Query(name) => {
            let Query(mut query) =
                Query::<HashMap<String, String>>::try_from_uri(request.uri()).ok()?;
            query.remove(name)
        }
    }
}

async fn require_admin(state: &AppState, email: &str) -> Result<(), BistroError> {
    match state.store.find_user_by_email(email).await? {
        Some(user) if user.is_admin() => Ok(()),
        _ => Err(BistroError::not_admin()),
    }
}
