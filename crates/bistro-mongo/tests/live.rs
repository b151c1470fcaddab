//! Integration tests for `MongoStore` against a live deployment.
//!
//! These tests require a MongoDB replica set (transactions are unavailable
//! on a standalone server), reachable at `MONGODB_TEST_URI`:
//!
//! ```bash
//! docker run -d -p 27017:27017 mongo:7 --replSet rs0
//! docker exec <id> mongosh --eval 'rs.initiate()'
//! MONGODB_TEST_URI=mongodb://localhost:27017/?directConnection=true \
//!     cargo test -p bistro-mongo -- --ignored
//! ```
//!
//! Each test works in a fresh database that is dropped afterwards.

use bistro_core::{
    BistroError, BistroStore, CartItem, MenuItem, Payment, RecordId, User, UserInsert,
};
use bistro_mongo::{MongoConfig, MongoStore};

fn test_uri() -> String {
    std::env::var("MONGODB_TEST_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017/?directConnection=true".to_string())
}

async fn fresh_store() -> (MongoStore, MongoConfig) {
    let config = MongoConfig::new(test_uri(), format!("bistro_test_{}", RecordId::generate()));
    let store = MongoStore::connect(&config)
        .await
        .expect("Failed to connect to test MongoDB");
    (store, config)
}

async fn drop_database(config: &MongoConfig) {
    let client = mongodb::Client::with_uri_str(&config.uri)
        .await
        .expect("Failed to open cleanup client");
    let _ = client.database(&config.database).drop().await;
}

#[tokio::test]
#[ignore = "Requires a MongoDB replica set at MONGODB_TEST_URI"]
async fn test_payment_with_missing_cart_item_writes_nothing() {
    let (store, config) = fresh_store().await;

    let menu_id = store
        .insert_menu_item(MenuItem::new("Caesar", "salad", 9.5))
        .await
        .unwrap()
        .inserted_id;
    let cart_id = store
        .insert_cart_item(CartItem::new("guest@bistro.test", menu_id.clone(), 9.5))
        .await
        .unwrap()
        .inserted_id;

    let payment = Payment::new("guest@bistro.test", "pi_live", 19.0)
        .with_cart_item(cart_id, menu_id.clone())
        .with_cart_item(RecordId::generate(), menu_id);

    let err = store.record_payment(payment).await.unwrap_err();
    assert!(matches!(err, BistroError::Conflict(_)));

    // The aborted transaction kept the cart item and stored no payment
    assert_eq!(store.carts_for_email("guest@bistro.test").await.unwrap().len(), 1);
    assert!(store.order_stats().await.unwrap().is_empty());

    store.shutdown().await.unwrap();
    drop_database(&config).await;
}

#[tokio::test]
#[ignore = "Requires a MongoDB replica set at MONGODB_TEST_URI"]
async fn test_payment_consumes_cart_items() {
    let (store, config) = fresh_store().await;

    let menu_id = store
        .insert_menu_item(MenuItem::new("Tiramisu", "dessert", 6.0))
        .await
        .unwrap()
        .inserted_id;
    let cart_id = store
        .insert_cart_item(CartItem::new("guest@bistro.test", menu_id.clone(), 6.0))
        .await
        .unwrap()
        .inserted_id;

    let payment =
        Payment::new("guest@bistro.test", "pi_live", 6.0).with_cart_item(cart_id, menu_id);
    let receipt = store.record_payment(payment.clone()).await.unwrap();
    assert_eq!(receipt.delete_result.deleted_count, 1);
    assert!(store.carts_for_email("guest@bistro.test").await.unwrap().is_empty());

    // Replaying the same checkout is rejected
    assert!(matches!(
        store.record_payment(payment).await,
        Err(BistroError::Conflict(_))
    ));

    let stats = store.order_stats().await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].count, 1);

    store.shutdown().await.unwrap();
    drop_database(&config).await;
}

#[tokio::test]
#[ignore = "Requires a MongoDB replica set at MONGODB_TEST_URI"]
async fn test_concurrent_sign_ups_store_one_user() {
    let (store, config) = fresh_store().await;

    let (first, second) = tokio::join!(
        store.insert_user(User::new("race@bistro.test")),
        store.insert_user(User::new("race@bistro.test")),
    );
    let outcomes = [first.unwrap(), second.unwrap()];
    let inserted = outcomes
        .iter()
        .filter(|o| matches!(o, UserInsert::Inserted(_)))
        .count();
    assert_eq!(inserted, 1);
    assert!(outcomes.contains(&UserInsert::AlreadyExists));
    assert_eq!(store.list_users().await.unwrap().len(), 1);

    store.shutdown().await.unwrap();
    drop_database(&config).await;
}
