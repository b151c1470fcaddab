//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the document store, payment gateway, token service, access
//! policy and configuration.

use bistro_core::{
    AccessPolicy, BistroError, BoxedPaymentGateway, BoxedStore, IssuancePolicy, MemoryStore,
    TokenService,
};
use bistro_mongo::MongoStore;
use bistro_stripe::StripeIntentGateway;
use std::sync::Arc;
use tracing::{info, warn};

/// Which document store backs the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    /// Process memory; for local runs only
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = BistroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(BistroError::Configuration(format!(
                "BISTRO_STORE must be mongo or memory, got {}",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Token signing secret
    pub access_token_secret: String,
    /// Credential the sign-in front end presents to mint tokens
    pub token_issuer_key: Option<String>,
    /// Document store backend
    pub store_backend: StoreBackend,
}

impl AppConfig {
    /// Load from environment variables. `ACCESS_TOKEN` is required.
    pub fn from_env() -> Result<Self, BistroError> {
        dotenvy::dotenv().ok();

        let access_token_secret = std::env::var("ACCESS_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BistroError::Configuration("ACCESS_TOKEN not set".to_string()))?;

        let port = match std::env::var("PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| BistroError::Configuration(format!("invalid PORT: {}", p)))?,
            Err(_) => 5000,
        };

        let store_backend = match std::env::var("BISTRO_STORE") {
            Ok(backend) => backend.parse()?,
            Err(_) => StoreBackend::Mongo,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            access_token_secret,
            token_issuer_key: std::env::var("TOKEN_ISSUER_KEY").ok(),
            store_backend,
        })
    }

    /// Defaults with an explicit signing secret (for testing)
    pub fn new(access_token_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            environment: "development".to_string(),
            access_token_secret: access_token_secret.into(),
            token_issuer_key: None,
            store_backend: StoreBackend::Memory,
        }
    }

    /// Builder: require this key on token issuance
    pub fn with_issuer_key(mut self, key: impl Into<String>) -> Self {
        self.token_issuer_key = Some(key.into());
        self
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, BistroError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| BistroError::Configuration(format!("invalid HOST/PORT: {}", e)))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("token_issuer_key", &self.token_issuer_key.as_ref().map(|_| "***"))
            .field("store_backend", &self.store_backend)
            .finish_non_exhaustive()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Document store
    pub store: BoxedStore,
    /// Payment gateway
    pub gateway: BoxedPaymentGateway,
    /// Session token signer/verifier
    pub tokens: TokenService,
    /// Who may mint tokens
    pub issuance: IssuancePolicy,
    /// Route → access table
    pub policy: Arc<AccessPolicy>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Assemble state from already-constructed collaborators
    pub fn new(config: AppConfig, store: BoxedStore, gateway: BoxedPaymentGateway) -> Self {
        let tokens = TokenService::new(config.access_token_secret.as_bytes());
        let issuance = IssuancePolicy::from_key(config.token_issuer_key.clone());

        Self {
            store,
            gateway,
            tokens,
            issuance,
            policy: Arc::new(AccessPolicy::bistro()),
            config,
        }
    }

    /// Connect the configured store and initialize Stripe
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let gateway = StripeIntentGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        if gateway.config().is_live_mode() && !config.is_production() {
            warn!(
                "Live Stripe key in the {} environment: real cards will be charged",
                config.environment
            );
        }

        let store: BoxedStore = match config.store_backend {
            StoreBackend::Mongo => Arc::new(
                MongoStore::from_env()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to connect to MongoDB: {}", e))?,
            ),
            StoreBackend::Memory => {
                warn!("Using the in-memory store; all data is lost on exit");
                Arc::new(MemoryStore::new())
            }
        };

        let state = Self::new(config, store, Arc::new(gateway));
        if state.issuance.is_open() {
            warn!("TOKEN_ISSUER_KEY is not set: POST /jwt will sign tokens for any email");
        }
        info!(
            "Store: {}, payment gateway: {}",
            state.store.backend_name(),
            state.gateway.provider_name()
        );

        Ok(state)
    }
}
