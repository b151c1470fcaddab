//! # Error Types
//!
//! Typed error handling for the Bistro backend.
//! Store, token and gateway operations all return `Result<T, BistroError>`.

use thiserror::Error;

/// Core error type for all Bistro operations
#[derive(Debug, Error)]
pub enum BistroError {
    /// No credential presented
    #[error("{0}")]
    Unauthorized(String),

    /// Credential invalid, expired, or insufficient for the route
    #[error("{0}")]
    Forbidden(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Write rejected because the records it depends on changed
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration errors (missing secrets, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Payment gateway API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with the gateway
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BistroError {
    /// Missing credential, with the message clients have always received.
    pub fn unauthorized() -> Self {
        BistroError::Unauthorized("unauthorized access".to_string())
    }

    /// Bad or expired credential.
    pub fn no_access() -> Self {
        BistroError::Forbidden("no access".to_string())
    }

    /// Valid credential without the admin role.
    pub fn not_admin() -> Self {
        BistroError::Forbidden("Forbidden".to_string())
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            BistroError::Unauthorized(_) => 401,
            BistroError::Forbidden(_) => 403,
            BistroError::InvalidRequest(_) => 400,
            BistroError::Conflict(_) => 409,
            BistroError::Configuration(_) => 500,
            BistroError::Store(_) => 502,
            BistroError::ProviderError { .. } => 502,
            BistroError::NetworkError(_) => 503,
            BistroError::Serialization(_) => 500,
            BistroError::Internal(_) => 500,
        }
    }
}

impl From<std::convert::Infallible> for BistroError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Result type alias for Bistro operations
pub type BistroResult<T> = Result<T, BistroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_messages() {
        assert_eq!(BistroError::unauthorized().to_string(), "unauthorized access");
        assert_eq!(BistroError::no_access().to_string(), "no access");
        assert_eq!(BistroError::not_admin().to_string(), "Forbidden");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(BistroError::unauthorized().status_code(), 401);
        assert_eq!(BistroError::not_admin().status_code(), 403);
        assert_eq!(
            BistroError::InvalidRequest("test".into()).status_code(),
            400
        );
        assert_eq!(BistroError::Conflict("cart".into()).status_code(), 409);
        assert_eq!(BistroError::NetworkError("timeout".into()).status_code(), 503);
        assert_eq!(BistroError::Store("down".into()).status_code(), 502);
    }
}
