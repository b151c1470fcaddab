//! Checkout handlers

use crate::auth::Caller;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{extract::State, Extension, Json};
use bistro_core::{BistroError, Currency, Payment, PaymentReceipt};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    /// Order total in dollars
    pub price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
}

/// Record a completed checkout and remove the purchased cart items
#[instrument(skip_all, fields(caller = %caller.email(), items = payment.cart_items.len()))]
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(mut payment): Json<Payment>,
) -> ApiResult<Json<PaymentReceipt>> {
    payment.id = None;
    if payment.email != caller.email() {
        warn!("Payment recorded for {} by another caller", payment.email);
    }

    let receipt = state.store.record_payment(payment).await?;
    info!(
        "Recorded payment {}, removed {} cart items",
        receipt.insert_result.inserted_id, receipt.delete_result.deleted_count
    );

    Ok(Json(receipt))
}

/// Create a card charge intent for the order total
#[instrument(skip(state))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<IntentRequest>,
) -> ApiResult<Json<IntentResponse>> {
    if !request.price.is_finite() {
        return Err(BistroError::InvalidRequest("price must be a number".to_string()).into());
    }

    let currency = Currency::USD;
    let amount = currency.to_smallest_unit(request.price);
    let intent = state.gateway.create_intent(amount, currency).await?;
    info!("Created {} intent {}", state.gateway.provider_name(), intent.id);

    Ok(Json(IntentResponse {
        client_secret: intent.client_secret,
    }))
}
