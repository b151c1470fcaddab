//! # In-Memory Store
//!
//! `BistroStore` kept in process memory. Used for local runs without a
//! database and by the HTTP tests. One lock guards all collections, which
//! makes `record_payment` atomic.

use super::{BistroStore, DeleteResult, InsertResult, UpdateResult, UserInsert};
use crate::cart::CartItem;
use crate::error::{BistroError, BistroResult};
use crate::id::RecordId;
use crate::menu::{MenuItem, Review};
use crate::payment::{round_cents, AdminStats, CategoryStats, Payment, PaymentReceipt};
use crate::user::{Role, User};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    menu: Vec<MenuItem>,
    reviews: Vec<Review>,
    carts: Vec<CartItem>,
    payments: Vec<Payment>,
}

/// Process-local document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load reviews, which have no write route
    pub async fn seed_reviews(&self, reviews: impl IntoIterator<Item = Review>) {
        let mut inner = self.inner.write().await;
        for mut review in reviews {
            review.id.get_or_insert_with(RecordId::generate);
            inner.reviews.push(review);
        }
    }

    /// Stored payments, oldest first
    pub async fn payments(&self) -> Vec<Payment> {
        self.inner.read().await.payments.clone()
    }
}

fn assign_id(id: &mut Option<RecordId>) -> RecordId {
    id.get_or_insert_with(RecordId::generate).clone()
}

fn delete_where<T>(docs: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> u64 {
    let before = docs.len();
    docs.retain(|d| !pred(d));
    (before - docs.len()) as u64
}

#[async_trait]
impl BistroStore for MemoryStore {
    async fn list_users(&self) -> BistroResult<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn find_user_by_email(&self, email: &str) -> BistroResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, mut user: User) -> BistroResult<UserInsert> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Ok(UserInsert::AlreadyExists);
        }
        let id = assign_id(&mut user.id);
        inner.users.push(user);
        Ok(UserInsert::Inserted(InsertResult::new(id)))
    }

    async fn set_user_role(&self, id: &RecordId, role: Option<Role>) -> BistroResult<UpdateResult> {
        let mut inner = self.inner.write().await;
        match inner.users.iter_mut().find(|u| u.id.as_ref() == Some(id)) {
            Some(user) if user.role == role => Ok(UpdateResult::new(1, 0)),
            Some(user) => {
                user.role = role;
                Ok(UpdateResult::new(1, 1))
            }
            None => Ok(UpdateResult::new(0, 0)),
        }
    }

    async fn list_menu(&self) -> BistroResult<Vec<MenuItem>> {
        Ok(self.inner.read().await.menu.clone())
    }

    async fn insert_menu_item(&self, mut item: MenuItem) -> BistroResult<InsertResult> {
        let id = assign_id(&mut item.id);
        self.inner.write().await.menu.push(item);
        Ok(InsertResult::new(id))
    }

    async fn delete_menu_item(&self, id: &RecordId) -> BistroResult<DeleteResult> {
        let mut inner = self.inner.write().await;
        let deleted = delete_where(&mut inner.menu, |m| m.id.as_ref() == Some(id));
        Ok(DeleteResult::new(deleted))
    }

    async fn list_reviews(&self) -> BistroResult<Vec<Review>> {
        Ok(self.inner.read().await.reviews.clone())
    }

    async fn insert_cart_item(&self, mut item: CartItem) -> BistroResult<InsertResult> {
        let id = assign_id(&mut item.id);
        self.inner.write().await.carts.push(item);
        Ok(InsertResult::new(id))
    }

    async fn carts_for_email(&self, email: &str) -> BistroResult<Vec<CartItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .carts
            .iter()
            .filter(|c| c.is_owned_by(email))
            .cloned()
            .collect())
    }

    async fn delete_cart_item(&self, id: &RecordId) -> BistroResult<DeleteResult> {
        let mut inner = self.inner.write().await;
        let deleted = delete_where(&mut inner.carts, |c| c.id.as_ref() == Some(id));
        Ok(DeleteResult::new(deleted))
    }

    async fn record_payment(&self, mut payment: Payment) -> BistroResult<PaymentReceipt> {
        let consumed: HashSet<RecordId> = payment.distinct_cart_items().into_iter().collect();

        let mut inner = self.inner.write().await;
        let present = inner
            .carts
            .iter()
            .filter(|c| c.id.as_ref().is_some_and(|id| consumed.contains(id)))
            .count();
        if present != consumed.len() {
            return Err(BistroError::Conflict(format!(
                "{} of {} cart items are no longer in the cart",
                consumed.len() - present,
                consumed.len()
            )));
        }

        let id = assign_id(&mut payment.id);
        inner.payments.push(payment);
        let deleted = delete_where(&mut inner.carts, |c| {
            c.id.as_ref().is_some_and(|id| consumed.contains(id))
        });
        debug!("Recorded payment {}, removed {} cart items", id, deleted);

        Ok(PaymentReceipt {
            insert_result: InsertResult::new(id),
            delete_result: DeleteResult::new(deleted),
        })
    }

    async fn admin_stats(&self) -> BistroResult<AdminStats> {
        let inner = self.inner.read().await;
        Ok(AdminStats {
            users: inner.users.len() as u64,
            products: inner.menu.len() as u64,
            orders: inner.payments.len() as u64,
            revenue: round_cents(inner.payments.iter().map(|p| p.price).sum()),
        })
    }

    async fn order_stats(&self) -> BistroResult<Vec<CategoryStats>> {
        let inner = self.inner.read().await;
        let mut by_category: BTreeMap<String, (u64, f64)> = BTreeMap::new();

        // Inner join: purchased ids whose menu item was deleted are skipped
        for menu_id in inner.payments.iter().flat_map(|p| p.menu_items.iter()) {
            if let Some(item) = inner.menu.iter().find(|m| m.id.as_ref() == Some(menu_id)) {
                let entry = by_category.entry(item.category.clone()).or_default();
                entry.0 += 1;
                entry.1 += item.price;
            }
        }

        Ok(by_category
            .into_iter()
            .map(|(category, (count, total))| CategoryStats {
                category,
                count,
                total: round_cents(total),
            })
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn menu_item(store: &MemoryStore, name: &str, category: &str, price: f64) -> RecordId {
        store
            .insert_menu_item(MenuItem::new(name, category, price))
            .await
            .unwrap()
            .inserted_id
    }

    async fn cart_item(store: &MemoryStore, email: &str, menu_id: &RecordId, price: f64) -> RecordId {
        store
            .insert_cart_item(CartItem::new(email, menu_id.clone(), price))
            .await
            .unwrap()
            .inserted_id
    }

    #[tokio::test]
    async fn test_duplicate_email_is_not_inserted() {
        let store = MemoryStore::new();
        let first = store.insert_user(User::new("guest@bistro.test")).await.unwrap();
        assert!(matches!(first, UserInsert::Inserted(_)));

        for _ in 0..3 {
            let again = store.insert_user(User::new("guest@bistro.test")).await.unwrap();
            assert_eq!(again, UserInsert::AlreadyExists);
        }
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_user_role_counts() {
        let store = MemoryStore::new();
        let UserInsert::Inserted(ack) = store.insert_user(User::new("chef@bistro.test")).await.unwrap() else {
            panic!("expected insert");
        };

        let first = store.set_user_role(&ack.inserted_id, Some(Role::Admin)).await.unwrap();
        assert_eq!((first.matched_count, first.modified_count), (1, 1));
        let again = store.set_user_role(&ack.inserted_id, Some(Role::Admin)).await.unwrap();
        assert_eq!((again.matched_count, again.modified_count), (1, 0));
        let missing = store.set_user_role(&RecordId::generate(), None).await.unwrap();
        assert_eq!(missing.matched_count, 0);

        let user = store.find_user_by_email("chef@bistro.test").await.unwrap().unwrap();
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_record_payment_consumes_cart() {
        let store = MemoryStore::new();
        let soup = menu_item(&store, "Soup", "soup", 5.5).await;
        let id1 = cart_item(&store, "guest@bistro.test", &soup, 5.5).await;
        let id2 = cart_item(&store, "guest@bistro.test", &soup, 5.5).await;
        let keep = cart_item(&store, "other@bistro.test", &soup, 5.5).await;

        let payment = Payment::new("guest@bistro.test", "pi_1", 11.0)
            .with_cart_item(id1, soup.clone())
            .with_cart_item(id2, soup);
        let receipt = store.record_payment(payment).await.unwrap();

        assert_eq!(receipt.delete_result.deleted_count, 2);
        assert!(store.carts_for_email("guest@bistro.test").await.unwrap().is_empty());
        let others = store.carts_for_email("other@bistro.test").await.unwrap();
        assert_eq!(others[0].id.as_ref(), Some(&keep));
        assert_eq!(store.payments().await.len(), 1);
    }

    #[tokio::test]
    async fn test_record_payment_conflict_writes_nothing() {
        let store = MemoryStore::new();
        let soup = menu_item(&store, "Soup", "soup", 5.5).await;
        let id1 = cart_item(&store, "guest@bistro.test", &soup, 5.5).await;

        let payment = Payment::new("guest@bistro.test", "pi_1", 11.0)
            .with_cart_item(id1, soup.clone())
            .with_cart_item(RecordId::generate(), soup);
        let err = store.record_payment(payment).await.unwrap_err();

        assert_eq!(err.status_code(), 409);
        assert_eq!(store.carts_for_email("guest@bistro.test").await.unwrap().len(), 1);
        assert!(store.payments().await.is_empty());
    }

    #[tokio::test]
    async fn test_order_stats_groups_by_category() {
        let store = MemoryStore::new();
        let caesar = menu_item(&store, "Caesar", "salad", 10.126).await;
        let greek = menu_item(&store, "Greek", "salad", 4.33).await;
        let cake = menu_item(&store, "Cake", "dessert", 6.0).await;

        let mut payment = Payment::new("guest@bistro.test", "pi_1", 14.46);
        payment.menu_items = vec![caesar, greek];
        store.record_payment(payment).await.unwrap();
        let mut payment = Payment::new("guest@bistro.test", "pi_2", 6.0);
        payment.menu_items = vec![cake];
        store.record_payment(payment).await.unwrap();

        let stats = store.order_stats().await.unwrap();
        assert_eq!(
            stats,
            vec![
                CategoryStats {
                    category: "dessert".into(),
                    count: 1,
                    total: 6.0
                },
                CategoryStats {
                    category: "salad".into(),
                    count: 2,
                    total: 14.46
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_admin_stats() {
        let store = MemoryStore::new();
        store.insert_user(User::new("a@bistro.test")).await.unwrap();
        menu_item(&store, "Soup", "soup", 5.5).await;
        store
            .record_payment(Payment::new("a@bistro.test", "pi_1", 10.1))
            .await
            .unwrap();
        store
            .record_payment(Payment::new("a@bistro.test", "pi_2", 0.2))
            .await
            .unwrap();

        let stats = store.admin_stats().await.unwrap();
        assert_eq!(stats.users, 1);
        assert_eq!(stats.products, 1);
        assert_eq!(stats.orders, 2);
        assert_eq!(stats.revenue, 10.3);
    }
}
