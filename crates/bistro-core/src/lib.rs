//! # bistro-core
//!
//! Core types and traits for the Bistro ordering backend.
//!
//! This crate provides:
//! - Domain documents: `User`, `MenuItem`, `Review`, `CartItem`, `Payment`
//! - `BistroStore` trait for document store implementations, plus `MemoryStore`
//! - `PaymentGateway` trait for charge-intent providers
//! - `TokenService` and `IssuancePolicy` for session tokens
//! - `AccessPolicy`, the route → access table
//! - `BistroError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use bistro_core::{BistroStore, CartItem, MemoryStore, Payment};
//!
//! let store = MemoryStore::new();
//! let ack = store.insert_cart_item(CartItem::new("guest@bistro.test", menu_id.clone(), 9.5)).await?;
//!
//! let payment = Payment::new("guest@bistro.test", "pi_123", 9.5)
//!     .with_cart_item(ack.inserted_id, menu_id);
//! let receipt = store.record_payment(payment).await?;
//! assert_eq!(receipt.delete_result.deleted_count, 1);
//! ```

pub mod cart;
pub mod error;
pub mod gateway;
pub mod id;
pub mod menu;
pub mod payment;
pub mod policy;
pub mod store;
pub mod token;
pub mod user;

// Re-exports for convenience
pub use cart::CartItem;
pub use error::{BistroError, BistroResult};
pub use gateway::{BoxedPaymentGateway, PaymentGateway};
pub use id::RecordId;
pub use menu::{MenuItem, Review};
pub use payment::{
    round_cents, AdminStats, CategoryStats, Currency, Payment, PaymentIntent, PaymentReceipt,
};
pub use policy::{Access, AccessPolicy, ParamSource};
pub use store::{
    BistroStore, BoxedStore, DeleteResult, InsertResult, MemoryStore, UpdateResult, UserInsert,
};
pub use token::{IdentityClaims, IssuancePolicy, TokenService, TOKEN_TTL_SECS};
pub use user::{NewUser, Role, User};
