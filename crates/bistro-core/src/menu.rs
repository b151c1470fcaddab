//! # Menu and Review Types

use crate::id::RecordId;
use serde::{Deserialize, Serialize};

/// A dish on the menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    pub name: String,

    /// Menu section, e.g. "salad" or "dessert"
    pub category: String,

    /// Price in dollars
    pub price: f64,

    #[serde(default)]
    pub image: String,

    #[serde(default, alias = "recipe")]
    pub description: String,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: category.into(),
            price,
            image: String::new(),
            description: String::new(),
        }
    }
}

/// A customer review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(alias = "name")]
    pub author: String,

    pub rating: f64,

    #[serde(default, alias = "details")]
    pub text: String,
}
