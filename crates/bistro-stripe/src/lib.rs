//! # bistro-stripe
//!
//! Stripe payment gateway for the Bistro ordering backend.
//!
//! `StripeIntentGateway` implements `PaymentGateway` over the PaymentIntents
//! API: the server creates an intent for the cart total and hands the client
//! secret to the browser, which confirms the card payment directly with Stripe.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bistro_core::{Currency, PaymentGateway};
//! use bistro_stripe::StripeIntentGateway;
//!
//! let gateway = StripeIntentGateway::from_env()?;
//! let intent = gateway.create_intent(1250, Currency::USD).await?;
//!
//! // Send intent.client_secret to the browser
//! ```

pub mod config;
pub mod intent;

// Re-exports
pub use config::StripeConfig;
pub use intent::StripeIntentGateway;
