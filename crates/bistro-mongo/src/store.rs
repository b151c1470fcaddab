//! # MongoDB Store
//!
//! `BistroStore` over a MongoDB database. One client is opened at startup,
//! shared by every request, and shut down when the server stops.
//!
//! Payments use a multi-document transaction, so the deployment must be a
//! replica set or sharded cluster (Atlas clusters always are).

use crate::config::MongoConfig;
use crate::documents::{
    category_row, from_oid, number, to_oid, CartDoc, MenuDoc, PaymentDoc, ReviewDoc, UserDoc,
};
use async_trait::async_trait;
use bistro_core::{
    round_cents, AdminStats, BistroError, BistroResult, BistroStore, CartItem, CategoryStats,
    DeleteResult, InsertResult, MenuItem, Payment, PaymentReceipt, RecordId, Review, Role,
    UpdateResult, User, UserInsert,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, ClientSession, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

const DUPLICATE_KEY: i32 = 11000;

fn store_err(e: mongodb::error::Error) -> BistroError {
    BistroError::Store(e.to_string())
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

fn inserted_id(id: Bson) -> BistroResult<RecordId> {
    id.as_object_id()
        .map(from_oid)
        .ok_or_else(|| BistroError::Store(format!("unexpected inserted id: {}", id)))
}

/// Order stats: join each purchased menu id to its menu item, group by category
fn order_stats_pipeline() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$menuItems" },
        doc! {
            "$lookup": {
                "from": "menu",
                "localField": "menuItems",
                "foreignField": "_id",
                "as": "menuItemsData",
            }
        },
        doc! { "$unwind": "$menuItemsData" },
        doc! {
            "$group": {
                "_id": "$menuItemsData.category",
                "count": { "$sum": 1 },
                "total": { "$sum": "$menuItemsData.price" },
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "category": "$_id",
                "count": 1,
                "total": { "$round": ["$total", 2] },
            }
        },
        doc! { "$sort": { "category": 1 } },
    ]
}

/// Every cart item a payment lists must be deleted by it; otherwise the
/// transaction is aborted.
fn ensure_cart_consumed(deleted: u64, expected: usize) -> BistroResult<()> {
    if deleted == expected as u64 {
        return Ok(());
    }
    Err(BistroError::Conflict(format!(
        "{} of {} cart items are no longer in the cart",
        (expected as u64).saturating_sub(deleted),
        expected
    )))
}

fn revenue_pipeline() -> Vec<Document> {
    vec![doc! { "$group": { "_id": Bson::Null, "total": { "$sum": "$price" } } }]
}

/// MongoDB-backed document store
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    users: Collection<UserDoc>,
    menu: Collection<MenuDoc>,
    reviews: Collection<ReviewDoc>,
    carts: Collection<CartDoc>,
    payments: Collection<PaymentDoc>,
}

impl MongoStore {
    /// Connect, verify the deployment answers, and ensure indexes
    #[instrument(skip(config), fields(database = %config.database))]
    pub async fn connect(config: &MongoConfig) -> BistroResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await.map_err(store_err)?;
        options.app_name = Some("bistro-boss".to_string());
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

        let client = Client::with_options(options).map_err(store_err)?;
        let store = Self::with_database(client.clone(), client.database(&config.database));

        store.ping().await?;
        store.ensure_indexes().await;

        info!("Connected to MongoDB database {}", config.database);
        Ok(store)
    }

    /// Load configuration from the environment and connect
    pub async fn from_env() -> BistroResult<Self> {
        Self::connect(&MongoConfig::from_env()?).await
    }

    fn with_database(client: Client, db: Database) -> Self {
        Self {
            users: db.collection("users"),
            menu: db.collection("menu"),
            reviews: db.collection("reviews"),
            carts: db.collection("carts"),
            payments: db.collection("payments"),
            client,
        }
    }

    async fn ensure_indexes(&self) {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let cart_owner = IndexModel::builder().keys(doc! { "email": 1 }).build();

        // Existing duplicate emails block the unique index; inserts still
        // check for an existing email first.
        if let Err(e) = self.users.create_index(unique_email).await {
            warn!("Could not create unique index on users.email: {}", e);
        }
        if let Err(e) = self.carts.create_index(cart_owner).await {
            warn!("Could not create index on carts.email: {}", e);
        }
    }

    async fn find_all<T, U>(collection: &Collection<T>, filter: Document) -> BistroResult<Vec<U>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
        U: TryFrom<T>,
        BistroError: From<<U as TryFrom<T>>::Error>,
    {
        let docs: Vec<T> = collection
            .find(filter)
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)?;

        docs.into_iter()
            .map(|d| U::try_from(d).map_err(BistroError::from))
            .collect()
    }

    async fn delete_by_id<T>(collection: &Collection<T>, id: &RecordId) -> BistroResult<DeleteResult>
    where
        T: Send + Sync,
    {
        let result = collection
            .delete_one(doc! { "_id": to_oid(id)? })
            .await
            .map_err(store_err)?;
        Ok(DeleteResult::new(result.deleted_count))
    }

    /// Insert and cart cleanup inside an open transaction
    async fn record_in_session(
        &self,
        session: &mut ClientSession,
        payment: PaymentDoc,
        cart_ids: &[ObjectId],
    ) -> BistroResult<PaymentReceipt> {
        let inserted = self
            .payments
            .insert_one(payment)
            .session(&mut *session)
            .await
            .map_err(store_err)?;

        let deleted = self
            .carts
            .delete_many(doc! { "_id": { "$in": cart_ids.to_vec() } })
            .session(&mut *session)
            .await
            .map_err(store_err)?;

        ensure_cart_consumed(deleted.deleted_count, cart_ids.len())?;

        Ok(PaymentReceipt {
            insert_result: InsertResult::new(inserted_id(inserted.inserted_id)?),
            delete_result: DeleteResult::new(deleted.deleted_count),
        })
    }
}

#[async_trait]
impl BistroStore for MongoStore {
    async fn list_users(&self) -> BistroResult<Vec<User>> {
        Self::find_all(&self.users, doc! {}).await
    }

    async fn find_user_by_email(&self, email: &str) -> BistroResult<Option<User>> {
        let found = self
            .users
            .find_one(doc! { "email": email })
            .await
            .map_err(store_err)?;
        Ok(found.map(User::from))
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert_user(&self, user: User) -> BistroResult<UserInsert> {
        if self.find_user_by_email(&user.email).await?.is_some() {
            debug!("User already exists");
            return Ok(UserInsert::AlreadyExists);
        }

        match self.users.insert_one(UserDoc::try_from(user)?).await {
            Ok(result) => Ok(UserInsert::Inserted(InsertResult::new(inserted_id(
                result.inserted_id,
            )?))),
            // Lost a race with a concurrent sign-up for the same email
            Err(e) if is_duplicate_key(&e) => Ok(UserInsert::AlreadyExists),
            Err(e) => Err(store_err(e)),
        }
    }

    async fn set_user_role(&self, id: &RecordId, role: Option<Role>) -> BistroResult<UpdateResult> {
        let update = match role {
            Some(role) => doc! { "$set": { "role": role.as_str() } },
            None => doc! { "$unset": { "role": "" } },
        };
        let result = self
            .users
            .update_one(doc! { "_id": to_oid(id)? }, update)
            .await
            .map_err(store_err)?;
        Ok(UpdateResult::new(result.matched_count, result.modified_count))
    }

    async fn list_menu(&self) -> BistroResult<Vec<MenuItem>> {
        Self::find_all(&self.menu, doc! {}).await
    }

    async fn insert_menu_item(&self, item: MenuItem) -> BistroResult<InsertResult> {
        let result = self
            .menu
            .insert_one(MenuDoc::try_from(item)?)
            .await
            .map_err(store_err)?;
        Ok(InsertResult::new(inserted_id(result.inserted_id)?))
    }

    async fn delete_menu_item(&self, id: &RecordId) -> BistroResult<DeleteResult> {
        Self::delete_by_id(&self.menu, id).await
    }

    async fn list_reviews(&self) -> BistroResult<Vec<Review>> {
        Self::find_all(&self.reviews, doc! {}).await
    }

    async fn insert_cart_item(&self, item: CartItem) -> BistroResult<InsertResult> {
        let result = self
            .carts
            .insert_one(CartDoc::try_from(item)?)
            .await
            .map_err(store_err)?;
        Ok(InsertResult::new(inserted_id(result.inserted_id)?))
    }

    async fn carts_for_email(&self, email: &str) -> BistroResult<Vec<CartItem>> {
        Self::find_all(&self.carts, doc! { "email": email }).await
    }

    async fn delete_cart_item(&self, id: &RecordId) -> BistroResult<DeleteResult> {
        Self::delete_by_id(&self.carts, id).await
    }

    #[instrument(skip(self, payment), fields(email = %payment.email, items = payment.cart_items.len()))]
    async fn record_payment(&self, payment: Payment) -> BistroResult<PaymentReceipt> {
        let cart_ids = payment
            .distinct_cart_items()
            .iter()
            .map(to_oid)
            .collect::<BistroResult<Vec<_>>>()?;
        let doc = PaymentDoc::try_from(payment)?;

        let mut session = self.client.start_session().await.map_err(store_err)?;
        session.start_transaction().await.map_err(store_err)?;

        match self.record_in_session(&mut session, doc, &cart_ids).await {
            Ok(receipt) => {
                session.commit_transaction().await.map_err(store_err)?;
                debug!(
                    "Recorded payment {}, removed {} cart items",
                    receipt.insert_result.inserted_id, receipt.delete_result.deleted_count
                );
                Ok(receipt)
            }
            Err(e) => {
                if let Err(abort) = session.abort_transaction().await {
                    warn!("Failed to abort payment transaction: {}", abort);
                }
                Err(e)
            }
        }
    }

    async fn admin_stats(&self) -> BistroResult<AdminStats> {
        let users = self.users.estimated_document_count().await.map_err(store_err)?;
        let products = self.menu.estimated_document_count().await.map_err(store_err)?;
        let orders = self.payments.estimated_document_count().await.map_err(store_err)?;

        let totals: Vec<Document> = self
            .payments
            .aggregate(revenue_pipeline())
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)?;
        let revenue = totals.first().map(|d| number(d, "total")).unwrap_or(0.0);

        Ok(AdminStats {
            users,
            products,
            orders,
            revenue: round_cents(revenue),
        })
    }

    async fn order_stats(&self) -> BistroResult<Vec<CategoryStats>> {
        let rows: Vec<Document> = self
            .payments
            .aggregate(order_stats_pipeline())
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)?;

        rows.iter().map(category_row).collect()
    }

    async fn ping(&self) -> BistroResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn shutdown(&self) -> BistroResult<()> {
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
