//! # bistro-api
//!
//! HTTP API layer for the Bistro ordering backend.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Route-level authorization middleware driven by `AccessPolicy`
//! - REST endpoints for users, menu, carts, checkout and dashboard stats
//!
//! ## Endpoints
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | GET | `/`, `/health` | public |
//! | POST | `/jwt` | issuer key when configured |
//! | GET | `/users` | token |
//! | POST | `/users` | public |
//! | GET | `/users/admin-check/{email}` | token for `email` |
//! | PATCH | `/users/admin/{id}?role=` | admin |
//! | GET | `/menu`, `/reviews` | public |
//! | POST | `/menu` | admin |
//! | DELETE | `/menu/{id}` | admin |
//! | POST | `/carts` | public |
//! | GET | `/carts?email=` | token for `email` |
//! | DELETE | `/carts/{id}` | public |
//! | POST | `/payments`, `/create-payment-intent` | token |
//! | GET | `/admin-stats`, `/order-stats` | admin |

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::Caller;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::{AppConfig, AppState, StoreBackend};
