//! # Payment Gateway Trait
//!
//! Seam between the checkout routes and the external card processor.
//! The only gateway call the backend makes is creating a charge intent;
//! confirmation happens in the browser with the returned client secret.

use crate::error::BistroResult;
use crate::payment::{Currency, PaymentIntent};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment gateway implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a charge intent.
    ///
    /// # Arguments
    /// * `amount` - Amount in the currency's smallest unit
    /// * `currency` - Charge currency
    ///
    /// Gateway failures are returned as-is; no retry is attempted.
    async fn create_intent(&self, amount: i64, currency: Currency)
        -> BistroResult<PaymentIntent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
