//! # Document Store Trait
//!
//! Typed accessors over the five Bistro collections: users, menu, reviews,
//! carts and payments. Every write returns the same acknowledgement shapes
//! the database driver reports, so handlers can hand them straight back to
//! the client.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            BistroStore (trait)           │
//! │  users · menu · reviews · carts · payments│
//! └──────────────────────────────────────────┘
//!                      ▲
//!           ┌──────────┴──────────┐
//!     ┌─────┴──────┐        ┌─────┴──────┐
//!     │ MongoStore │        │MemoryStore │
//!     └────────────┘        └────────────┘
//! ```

mod memory;

pub use memory::MemoryStore;

use crate::cart::CartItem;
use crate::error::BistroResult;
use crate::id::RecordId;
use crate::menu::{MenuItem, Review};
use crate::payment::{AdminStats, CategoryStats, Payment, PaymentReceipt};
use crate::user::{Role, User};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Acknowledgement of a single insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: RecordId,
}

impl InsertResult {
    pub fn new(inserted_id: RecordId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Acknowledgement of a single update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateResult {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
        }
    }
}

/// Acknowledgement of a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Outcome of a sign-up insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInsert {
    Inserted(InsertResult),
    /// A user with that email is already stored; nothing was written
    AlreadyExists,
}

/// Document store used by the route handlers.
///
/// Implementations must keep user emails unique and must apply
/// `record_payment` atomically.
#[async_trait]
pub trait BistroStore: Send + Sync {
    // -- users ---------------------------------------------------------------

    async fn list_users(&self) -> BistroResult<Vec<User>>;

    async fn find_user_by_email(&self, email: &str) -> BistroResult<Option<User>>;

    /// Insert unless a user with the same email exists
    async fn insert_user(&self, user: User) -> BistroResult<UserInsert>;

    /// Set or clear the role of the user with `id`
    async fn set_user_role(&self, id: &RecordId, role: Option<Role>) -> BistroResult<UpdateResult>;

    // -- menu ----------------------------------------------------------------

    async fn list_menu(&self) -> BistroResult<Vec<MenuItem>>;

    async fn insert_menu_item(&self, item: MenuItem) -> BistroResult<InsertResult>;

    async fn delete_menu_item(&self, id: &RecordId) -> BistroResult<DeleteResult>;

    // -- reviews -------------------------------------------------------------

    async fn list_reviews(&self) -> BistroResult<Vec<Review>>;

    // -- carts ---------------------------------------------------------------

    async fn insert_cart_item(&self, item: CartItem) -> BistroResult<InsertResult>;

    async fn carts_for_email(&self, email: &str) -> BistroResult<Vec<CartItem>>;

    async fn delete_cart_item(&self, id: &RecordId) -> BistroResult<DeleteResult>;

    // -- payments ------------------------------------------------------------

    /// Insert the payment and delete the cart items it consumed, as one unit.
    ///
    /// Fails with `Conflict` and writes nothing if any listed cart item no
    /// longer exists.
    async fn record_payment(&self, payment: Payment) -> BistroResult<PaymentReceipt>;

    // -- dashboard -----------------------------------------------------------

    async fn admin_stats(&self) -> BistroResult<AdminStats>;

    /// Per-category order counts and revenue, sorted by category
    async fn order_stats(&self) -> BistroResult<Vec<CategoryStats>>;

    // -- lifecycle -----------------------------------------------------------

    /// Round-trip to the backing database
    async fn ping(&self) -> BistroResult<()> {
        Ok(())
    }

    /// Release connections. Called once, after the server stops accepting.
    async fn shutdown(&self) -> BistroResult<()> {
        Ok(())
    }

    /// Backend name (for logging)
    fn backend_name(&self) -> &'static str;
}

/// Type alias for a shared store (dynamic dispatch)
pub type BoxedStore = Arc<dyn BistroStore>;
