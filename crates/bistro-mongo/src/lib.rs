//! # bistro-mongo
//!
//! MongoDB document store for the Bistro ordering backend.
//!
//! `MongoStore` implements `BistroStore` over the `users`, `menu`,
//! `reviews`, `carts` and `payments` collections of one database.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bistro_core::BistroStore;
//! use bistro_mongo::{MongoConfig, MongoStore};
//!
//! let store = MongoStore::connect(&MongoConfig::from_env()?).await?;
//! let menu = store.list_menu().await?;
//!
//! // On shutdown
//! store.shutdown().await?;
//! ```

pub mod config;
mod documents;
pub mod store;

// Re-exports
pub use config::MongoConfig;
pub use store::MongoStore;
