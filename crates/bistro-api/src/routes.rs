//! # Routes
//!
//! Axum router configuration for the Bistro API.
//! Access rules live in `AccessPolicy::bistro()`, not here.

use crate::auth;
use crate::handlers::{self, carts, menu, payments, stats, token, users};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Health: GET /, GET /health
/// - Tokens: POST /jwt
/// - Users: GET|POST /users, GET /users/admin-check/{email}, PATCH /users/admin/{id}
/// - Menu: GET|POST /menu, DELETE /menu/{id}, GET /reviews
/// - Carts: GET|POST /carts, DELETE /carts/{id}
/// - Checkout: POST /payments, POST /create-payment-intent
/// - Dashboard: GET /admin-stats, GET /order-stats
pub fn create_router(state: AppState) -> Router {
    // The browser client is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let user_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/admin-check/{email}", get(users::admin_check))
        .route("/users/admin/{id}", patch(users::set_role));

    let menu_routes = Router::new()
        .route("/menu", get(menu::list_menu).post(menu::add_menu_item))
        .route("/menu/{id}", delete(menu::delete_menu_item))
        .route("/reviews", get(menu::list_reviews));

    let cart_routes = Router::new()
        .route("/carts", get(carts::list_carts).post(carts::add_cart_item))
        .route("/carts/{id}", delete(carts::delete_cart_item));

    let checkout_routes = Router::new()
        .route("/payments", post(payments::record_payment))
        .route("/create-payment-intent", post(payments::create_payment_intent));

    let dashboard_routes = Router::new()
        .route("/admin-stats", get(stats::admin_stats))
        .route("/order-stats", get(stats::order_stats));

    Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/jwt", post(token::issue_token))
        .merge(user_routes)
        .merge(menu_routes)
        .merge(cart_routes)
        .merge(checkout_routes)
        .merge(dashboard_routes)
        // Runs only for matched routes, so unknown paths still 404
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authorize,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
