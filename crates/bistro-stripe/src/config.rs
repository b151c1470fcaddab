//! # Stripe Configuration
//!
//! Configuration management for the Stripe integration.
//! The secret key is loaded from the environment.

use bistro_core::BistroError;
use std::env;

const STRIPE_API_BASE: &str = "https://api.stripe.com";
const STRIPE_API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    pub fn from_env() -> Result<Self, BistroError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let secret_key = env::var("STRIPE_SECRET_KEY").map_err(|_| {
            BistroError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;

        Self::validated(secret_key)
    }

    /// Build from an explicit key, checking its format
    pub fn validated(secret_key: impl Into<String>) -> Result<Self, BistroError> {
        let config = Self::new(secret_key);
        if !config.is_test_mode() && !config.is_live_mode() {
            return Err(BistroError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }
        Ok(config)
    }

    /// Create config with an explicit key (for testing)
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base_url: STRIPE_API_BASE.to_string(),
            api_version: STRIPE_API_VERSION.to_string(),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("mode", &if self.is_live_mode() { "live" } else { "test" })
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_modes() {
        let config = StripeConfig::validated("sk_test_abc123").unwrap();
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());

        let config = StripeConfig::validated("sk_live_abc123").unwrap();
        assert!(config.is_live_mode());
    }

    #[test]
    fn test_rejects_publishable_key() {
        let err = StripeConfig::validated("pk_test_abc123").unwrap_err();
        assert!(matches!(err, BistroError::Configuration(_)));
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123");
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = StripeConfig::new("sk_test_abc123");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("abc123"));
        assert!(rendered.contains("test"));
    }
}
