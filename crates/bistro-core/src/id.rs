//! # Record Ids
//!
//! Every document is keyed by a 12-byte object id, rendered on the wire as
//! 24 lowercase hex characters.

use crate::error::{BistroError, BistroResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of a rendered record id
pub const RECORD_ID_LEN: usize = 24;

/// Opaque document id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Parse a rendered id, rejecting anything that is not 24 hex characters
    pub fn parse(raw: &str) -> BistroResult<Self> {
        if raw.len() == RECORD_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(BistroError::InvalidRequest(format!(
                "malformed id: {:?}",
                raw
            )))
        }
    }

    /// Generate a fresh random id
    pub fn generate() -> Self {
        let mut hex = Uuid::new_v4().simple().to_string();
        hex.truncate(RECORD_ID_LEN);
        Self(hex)
    }

    /// Render the raw 12 id bytes stored by the database
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = BistroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = BistroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let id = RecordId::parse("65A1F0C2B3D4E5F60718293A").unwrap();
        assert_eq!(id.as_str(), "65a1f0c2b3d4e5f60718293a");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(RecordId::parse("abc").is_err());
        assert!(RecordId::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
        assert_eq!(
            RecordId::parse("").unwrap_err().status_code(),
            400
        );
    }

    #[test]
    fn test_generated_ids_are_valid() {
        let id = RecordId::generate();
        assert_eq!(id.as_str().len(), RECORD_ID_LEN);
        assert!(RecordId::parse(id.as_str()).is_ok());
        assert_ne!(id, RecordId::generate());
    }

    #[test]
    fn test_from_bytes() {
        let id = RecordId::from_bytes([0x65, 0xa1, 0xf0, 0xc2, 0xb3, 0xd4, 0xe5, 0xf6, 0x07, 0x18, 0x29, 0x3a]);
        assert_eq!(id.as_str(), "65a1f0c2b3d4e5f60718293a");
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id: RecordId = serde_json::from_str("\"65a1f0c2b3d4e5f60718293a\"").unwrap();
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"65a1f0c2b3d4e5f60718293a\""
        );
        assert!(serde_json::from_str::<RecordId>("\"nope\"").is_err());
    }
}
