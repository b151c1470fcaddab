//! # User Types
//!
//! Users are created on first sign-in and keyed by email.

use crate::error::BistroError;
use crate::id::RecordId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Access tier stored on a user record. An unset role is an ordinary customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }

    /// Parse the `role` query value of the role-assignment route.
    /// `none`, `user` and the empty string clear the role.
    pub fn parse_assignment(raw: &str) -> Result<Option<Role>, BistroError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "user" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl FromStr for Role {
    type Err = BistroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            other => Err(BistroError::InvalidRequest(format!(
                "unknown role: {}",
                other
            ))),
        }
    }
}

/// A stored user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            name: None,
            photo_url: None,
            role: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Sign-up payload. A role sent by the client is dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl From<NewUser> for User {
    fn from(new: NewUser) -> Self {
        Self {
            id: None,
            email: new.email,
            name: new.name,
            photo_url: new.photo_url,
            role: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_assignment_parsing() {
        assert_eq!(Role::parse_assignment("admin").unwrap(), Some(Role::Admin));
        assert_eq!(Role::parse_assignment("ADMIN").unwrap(), Some(Role::Admin));
        assert_eq!(Role::parse_assignment("").unwrap(), None);
        assert_eq!(Role::parse_assignment("none").unwrap(), None);
        assert!(Role::parse_assignment("superuser").is_err());
    }

    #[test]
    fn test_new_user_drops_role() {
        let new: NewUser = serde_json::from_value(serde_json::json!({
            "email": "guest@bistro.test",
            "name": "Guest",
            "role": "admin"
        }))
        .unwrap();
        let user = User::from(new);
        assert!(!user.is_admin());
        assert_eq!(user.name.as_deref(), Some("Guest"));
    }

    #[test]
    fn test_user_json_shape() {
        let mut user = User::new("chef@bistro.test");
        user.id = Some(RecordId::parse("65a1f0c2b3d4e5f60718293a").unwrap());
        user.role = Some(Role::Admin);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["_id"], "65a1f0c2b3d4e5f60718293a");
        assert_eq!(json["role"], "admin");
        assert!(json.get("photoUrl").is_none());
    }
}
