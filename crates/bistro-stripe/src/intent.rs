//! # Stripe PaymentIntents
//!
//! Creates card charge intents. The browser confirms the intent with the
//! returned client secret; this side never sees card data.

use crate::config::StripeConfig;
use async_trait::async_trait;
use bistro_core::{BistroError, BistroResult, Currency, PaymentGateway, PaymentIntent};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe PaymentIntents gateway
pub struct StripeIntentGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeIntentGateway {
    /// Create a new gateway
    pub fn new(config: StripeConfig) -> BistroResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| BistroError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> BistroResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }
}

#[async_trait]
impl PaymentGateway for StripeIntentGateway {
    #[instrument(skip(self))]
    async fn create_intent(&self, amount: i64, currency: Currency) -> BistroResult<PaymentIntent> {
        if amount <= 0 {
            return Err(BistroError::InvalidRequest(format!(
                "charge amount must be positive, got {}",
                amount
            )));
        }

        debug!("Creating Stripe payment intent: amount={}", amount);

        let form_params = [
            ("amount", amount.to_string()),
            ("currency", currency.as_str().to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let url = format!("{}/v1/payment_intents", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| BistroError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BistroError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(BistroError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(BistroError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let intent: StripePaymentIntentResponse = serde_json::from_str(&body).map_err(|e| {
            BistroError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe payment intent: id={}", intent.id);

        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
            amount: intent.amount,
            currency,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntentResponse {
    id: String,
    client_secret: String,
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
