//! # Payment Types
//!
//! Completed checkouts, gateway charge intents, and the admin statistics
//! derived from them.

use crate::id::RecordId;
use crate::store::{DeleteResult, InsertResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Charge currency. The restaurant prices and charges in US dollars only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
}

impl Currency {
    /// ISO 4217 code as the gateway expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
        }
    }

    /// Convert a dollar amount to cents
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        (amount * 100.0).round() as i64
    }
}

fn default_status() -> String {
    "pending".to_string()
}

/// A completed checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    pub email: String,

    /// Gateway transaction id (the confirmed intent)
    pub transaction_id: String,

    /// Amount paid in dollars
    pub price: f64,

    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,

    #[serde(default = "default_status")]
    pub status: String,

    /// Cart items consumed by this payment
    #[serde(default)]
    pub cart_items: Vec<RecordId>,

    /// Menu items purchased, one entry per unit
    #[serde(default)]
    pub menu_items: Vec<RecordId>,
}

impl Payment {
    pub fn new(email: impl Into<String>, transaction_id: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            email: email.into(),
            transaction_id: transaction_id.into(),
            price,
            date: Utc::now(),
            status: default_status(),
            cart_items: Vec::new(),
            menu_items: Vec::new(),
        }
    }

    pub fn with_cart_item(mut self, cart_item: RecordId, menu_item: RecordId) -> Self {
        self.cart_items.push(cart_item);
        self.menu_items.push(menu_item);
        self
    }

    /// Cart ids to delete, without repeats, in first-seen order
    pub fn distinct_cart_items(&self) -> Vec<RecordId> {
        let mut seen = std::collections::HashSet::new();
        self.cart_items
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }
}

/// Outcome of recording a payment: the insert and the cart cleanup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub insert_result: InsertResult,
    pub delete_result: DeleteResult,
}

/// A gateway-side charge intent awaiting confirmation by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway's intent id
    pub id: String,
    /// Secret the browser uses to confirm the intent
    pub client_secret: String,
    /// Amount in smallest currency unit
    pub amount: i64,
    pub currency: Currency,
}

/// Dashboard totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub users: u64,
    /// Menu items
    pub products: u64,
    /// Payments
    pub orders: u64,
    /// Sum of payment prices, rounded to cents
    pub revenue: f64,
}

/// Orders and revenue for one menu category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub count: u64,
    pub total: f64,
}

/// Round a dollar amount to 2 decimal places
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_unit() {
        assert_eq!(Currency::USD.to_smallest_unit(12.34), 1234);
        assert_eq!(Currency::USD.to_smallest_unit(0.1 + 0.2), 30);
        assert_eq!(Currency::USD.to_smallest_unit(10.5), 1050);
        assert_eq!(Currency::USD.as_str(), "usd");
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(10.005_1), 10.01);
        assert_eq!(round_cents(14.5 + 9.99), 24.49);
    }

    #[test]
    fn test_payment_defaults_from_json() {
        let payment: Payment = serde_json::from_value(serde_json::json!({
            "email": "guest@bistro.test",
            "transactionId": "pi_123",
            "price": 20.5,
            "cartItems": ["65a1f0c2b3d4e5f60718293a"],
            "menuItems": ["65a1f0c2b3d4e5f60718293b"]
        }))
        .unwrap();
        assert_eq!(payment.status, "pending");
        assert_eq!(payment.cart_items.len(), 1);
    }

    #[test]
    fn test_distinct_cart_items() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        let mut payment = Payment::new("guest@bistro.test", "pi_1", 3.0);
        payment.cart_items = vec![a.clone(), b.clone(), a.clone()];
        assert_eq!(payment.distinct_cart_items(), vec![a, b]);
    }
}
