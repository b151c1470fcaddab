//! # Stored Document Shapes
//!
//! BSON layouts of the five collections and their conversions to the core
//! types. Field names follow the data already in the cluster (`recipe`,
//! `details`, string `menuItemId`), while join keys that the aggregation
//! needs (`cartItems`, `menuItems`) are stored as object ids.

use bistro_core::{
    BistroError, BistroResult, CartItem, CategoryStats, MenuItem, Payment, RecordId, Review, Role,
    User,
};
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};

pub(crate) fn to_oid(id: &RecordId) -> BistroResult<ObjectId> {
    ObjectId::parse_str(id.as_str())
        .map_err(|e| BistroError::InvalidRequest(format!("malformed id {}: {}", id, e)))
}

pub(crate) fn from_oid(oid: ObjectId) -> RecordId {
    RecordId::from_bytes(oid.bytes())
}

fn opt_oid(id: Option<RecordId>) -> BistroResult<Option<ObjectId>> {
    id.as_ref().map(to_oid).transpose()
}

/// Numeric field that may be stored as int32, int64 or double
pub(crate) fn number(doc: &Document, key: &str) -> f64 {
    match doc.get(key) {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

// -- users --------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Free-form in legacy data; only "admin" is meaningful
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<UserDoc> for User {
    fn from(doc: UserDoc) -> Self {
        Self {
            id: doc.id.map(from_oid),
            email: doc.email,
            name: doc.name,
            photo_url: doc.photo_url,
            role: doc.role.and_then(|r| r.parse::<Role>().ok()),
        }
    }
}

impl TryFrom<User> for UserDoc {
    type Error = BistroError;

    fn try_from(user: User) -> BistroResult<Self> {
        Ok(Self {
            id: opt_oid(user.id)?,
            email: user.email,
            name: user.name,
            photo_url: user.photo_url,
            role: user.role.map(|r| r.as_str().to_string()),
        })
    }
}

// -- menu ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MenuDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default, alias = "description")]
    pub recipe: String,
}

impl From<MenuDoc> for MenuItem {
    fn from(doc: MenuDoc) -> Self {
        Self {
            id: doc.id.map(from_oid),
            name: doc.name,
            category: doc.category,
            price: doc.price,
            image: doc.image,
            description: doc.recipe,
        }
    }
}

impl TryFrom<MenuItem> for MenuDoc {
    type Error = BistroError;

    fn try_from(item: MenuItem) -> BistroResult<Self> {
        Ok(Self {
            id: opt_oid(item.id)?,
            name: item.name,
            category: item.category,
            price: item.price,
            image: item.image,
            recipe: item.description,
        })
    }
}

// -- reviews ------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ReviewDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub rating: f64,
    #[serde(default)]
    pub details: String,
}

impl From<ReviewDoc> for Review {
    fn from(doc: ReviewDoc) -> Self {
        Self {
            id: doc.id.map(from_oid),
            author: doc.name,
            rating: doc.rating,
            text: doc.details,
        }
    }
}

// -- carts --------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub menu_item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub price: f64,
}

impl TryFrom<CartDoc> for CartItem {
    type Error = BistroError;

    fn try_from(doc: CartDoc) -> BistroResult<Self> {
        Ok(Self {
            id: doc.id.map(from_oid),
            email: doc.email,
            menu_item_id: RecordId::parse(&doc.menu_item_id)?,
            name: doc.name,
            image: doc.image,
            price: doc.price,
        })
    }
}

impl TryFrom<CartItem> for CartDoc {
    type Error = BistroError;

    fn try_from(item: CartItem) -> BistroResult<Self> {
        Ok(Self {
            id: opt_oid(item.id)?,
            email: item.email,
            menu_item_id: item.menu_item_id.into(),
            name: item.name,
            image: item.image,
            price: item.price,
        })
    }
}

// -- payments -----------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub transaction_id: String,
    pub price: f64,
    pub date: bson::DateTime,
    pub status: String,
    pub cart_items: Vec<ObjectId>,
    pub menu_items: Vec<ObjectId>,
}

impl TryFrom<Payment> for PaymentDoc {
    type Error = BistroError;

    fn try_from(payment: Payment) -> BistroResult<Self> {
        Ok(Self {
            id: opt_oid(payment.id)?,
            email: payment.email,
            transaction_id: payment.transaction_id,
            price: payment.price,
            date: bson::DateTime::from_millis(payment.date.timestamp_millis()),
            status: payment.status,
            cart_items: payment.cart_items.iter().map(to_oid).collect::<BistroResult<_>>()?,
            menu_items: payment.menu_items.iter().map(to_oid).collect::<BistroResult<_>>()?,
        })
    }
}

// -- aggregation rows ---------------------------------------------------------

/// One row of the order-stats pipeline
pub(crate) fn category_row(doc: &Document) -> BistroResult<CategoryStats> {
    let category = doc
        .get_str("category")
        .map_err(|e| BistroError::Serialization(format!("order stats row: {}", e)))?
        .to_string();

    Ok(CategoryStats {
        category,
        count: number(doc, "count") as u64,
        total: number(doc, "total"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_oid_round_trip() {
        let oid = ObjectId::new();
        let id = from_oid(oid);
        assert_eq!(id.as_str(), oid.to_hex());
        assert_eq!(to_oid(&id).unwrap(), oid);
    }

    #[test]
    fn test_legacy_role_strings() {
        let mut doc = UserDoc {
            id: Some(ObjectId::new()),
            email: "guest@bistro.test".into(),
            name: None,
            photo_url: None,
            role: Some("user".into()),
        };
        assert_eq!(User::from(doc.clone()).role, None);

        doc.role = Some("admin".into());
        assert_eq!(User::from(doc).role, Some(Role::Admin));
    }

    #[test]
    fn test_menu_doc_keeps_recipe_field() {
        let item = MenuItem {
            description: "Slow roasted".into(),
            ..MenuItem::new("Roast", "popular", 14.0)
        };
        let stored = bson::to_document(&MenuDoc::try_from(item).unwrap()).unwrap();
        assert_eq!(stored.get_str("recipe").unwrap(), "Slow roasted");
        assert!(stored.get("_id").is_none());
    }

    #[test]
    fn test_integer_prices_deserialize() {
        let stored = doc! { "name": "Soup", "category": "soup", "price": 9, "recipe": "" };
        let doc: MenuDoc = bson::from_document(stored).unwrap();
        assert_eq!(doc.price, 9.0);
    }

    #[test]
    fn test_payment_ids_become_object_ids() {
        let cart = RecordId::generate();
        let menu = from_oid(ObjectId::new());
        let payment = Payment::new("guest@bistro.test", "pi_1", 9.5).with_cart_item(cart.clone(), menu);
        let doc = PaymentDoc::try_from(payment).unwrap();
        assert_eq!(from_oid(doc.cart_items[0]), cart);
    }

    #[test]
    fn test_category_row() {
        let row = doc! { "category": "salad", "count": 2, "total": 14.46 };
        let stats = category_row(&row).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total, 14.46);
        assert!(category_row(&doc! { "count": 1 }).is_err());
    }
}
