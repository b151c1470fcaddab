//! # MongoDB Configuration
//!
//! Connection settings loaded from environment variables.

use bistro_core::BistroError;
use std::env;

const DEFAULT_DATABASE: &str = "bistroDB";

/// MongoDB connection configuration
#[derive(Clone)]
pub struct MongoConfig {
    /// Connection string (mongodb:// or mongodb+srv://)
    pub uri: String,

    /// Database holding the Bistro collections
    pub database: String,
}

impl MongoConfig {
    /// Load configuration from environment variables.
    ///
    /// Either `MONGODB_URI`, or all of `DB_USER`, `DB_PASS` and `DB_HOST`
    /// for an Atlas-style `mongodb+srv` cluster. `DB_NAME` defaults to
    /// `bistroDB`.
    pub fn from_env() -> Result<Self, BistroError> {
        dotenvy::dotenv().ok();

        let database = env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());

        if let Ok(uri) = env::var("MONGODB_URI") {
            return Ok(Self::new(uri, database));
        }

        let var = |name: &str| {
            env::var(name).map_err(|_| {
                BistroError::Configuration(format!("MONGODB_URI or {} must be set", name))
            })
        };
        let uri = Self::atlas_uri(&var("DB_USER")?, &var("DB_PASS")?, &var("DB_HOST")?);

        Ok(Self::new(uri, database))
    }

    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
        }
    }

    /// Build an SRV connection string for a hosted cluster
    pub fn atlas_uri(user: &str, pass: &str, host: &str) -> String {
        format!(
            "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
            user, pass, host
        )
    }
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}
