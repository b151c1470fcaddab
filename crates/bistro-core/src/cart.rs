//! # Cart Types

use crate::id::RecordId;
use serde::{Deserialize, Serialize};

/// A pending order line owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    /// Owning user's email
    pub email: String,

    pub menu_item_id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub price: f64,
}

impl CartItem {
    pub fn new(email: impl Into<String>, menu_item_id: RecordId, price: f64) -> Self {
        Self {
            id: None,
            email: email.into(),
            menu_item_id,
            name: None,
            image: None,
            price,
        }
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        self.email == email
    }
}
