//! # Token Service
//!
//! Issues and verifies HS256 session tokens carrying the caller's email.
//! Tokens live for one hour; verification allows no clock leeway.

use crate::error::{BistroError, BistroResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token lifetime in seconds
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Registered claims the service owns; callers cannot set them.
const RESERVED_CLAIMS: [&str; 3] = ["iat", "exp", "nbf"];

/// Identity carried by a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub email: String,

    /// Any other claims the sign-in client attached (name, photo, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl IdentityClaims {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SignedClaims {
    #[serde(flatten)]
    identity: IdentityClaims,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::seconds(TOKEN_TTL_SECS),
        }
    }

    /// Issue a token valid for one hour from now
    pub fn issue(&self, identity: IdentityClaims) -> BistroResult<String> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if signed at `issued_at`
    pub fn issue_at(
        &self,
        mut identity: IdentityClaims,
        issued_at: DateTime<Utc>,
    ) -> BistroResult<String> {
        if identity.email.trim().is_empty() {
            return Err(BistroError::InvalidRequest(
                "token claims must include an email".to_string(),
            ));
        }
        for reserved in RESERVED_CLAIMS {
            identity.extra.remove(reserved);
        }

        let claims = SignedClaims {
            identity,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| BistroError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, returning the identity claims
    pub fn verify(&self, token: &str) -> BistroResult<IdentityClaims> {
        let data = decode::<SignedClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!("Rejected token: {:?}", e.kind());
            BistroError::no_access()
        })?;
        Ok(data.claims.identity)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

/// Who may call the token issuance route
#[derive(Clone, PartialEq, Eq)]
pub enum IssuancePolicy {
    /// Anyone may mint a token for any email
    Open,
    /// The sign-in front end must present this key as a bearer credential
    SharedKey(String),
}

impl IssuancePolicy {
    /// `SharedKey` when a non-empty key is configured, otherwise `Open`
    pub fn from_key(key: Option<String>) -> Self {
        match key {
            Some(k) if !k.trim().is_empty() => IssuancePolicy::SharedKey(k),
            _ => IssuancePolicy::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, IssuancePolicy::Open)
    }

    /// Check the credential presented to the issuance route
    pub fn authorize(&self, presented: Option<&str>) -> BistroResult<()> {
        match self {
            IssuancePolicy::Open => Ok(()),
            IssuancePolicy::SharedKey(expected) => match presented {
                None => Err(BistroError::unauthorized()),
                Some(key) if constant_time_compare(key, expected) => Ok(()),
                Some(_) => Err(BistroError::no_access()),
            },
        }
    }
}

impl std::fmt::Debug for IssuancePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssuancePolicy::Open => f.write_str("Open"),
            IssuancePolicy::SharedKey(_) => f.write_str("SharedKey(***)"),
        }
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
