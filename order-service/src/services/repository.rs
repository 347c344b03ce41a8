use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, to_bson, DateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, ClientSession, Collection, Database, IndexModel};
use secrecy::ExposeSecret;

use super::store::{
    OrderBatch, OrderStore, PaymentMethodUpdate, StatusUpdate, StoreError, UpdateOutcome,
};
use crate::config::MongoConfig;
use crate::models::{CartItem, Order, PaymentMethod, TableReservation, User};

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed store. Requires a replica set for multi-document transactions.
#[derive(Clone)]
pub struct MongoOrderStore {
    client: Client,
    users: Collection<User>,
    orders: Collection<Order>,
    reservations: Collection<TableReservation>,
    cart_items: Collection<CartItem>,
    payment_methods: Collection<PaymentMethod>,
}

impl MongoOrderStore {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            users: db.collection("users"),
            orders: db.collection("orders"),
            reservations: db.collection("tableReservations"),
            cart_items: db.collection("cartItems"),
            payment_methods: db.collection("paymentMethods"),
        }
    }

    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(config.uri.expose_secret()).await?;
        let db = client.database(&config.database);
        Ok(Self::new(client, &db))
    }

    pub async fn init_indexes(&self) -> Result<(), StoreError> {
        let user_orders = IndexModel::builder()
            .keys(doc! { "userId": 1, "orderDate": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_orders_idx".to_string())
                    .build(),
            )
            .build();
        self.orders.create_indexes([user_orders], None).await?;

        let user_cart = IndexModel::builder()
            .keys(doc! { "userId": 1, "menuItemId": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_cart_item_idx".to_string())
                    .build(),
            )
            .build();
        self.cart_items.create_indexes([user_cart], None).await?;

        let order_reservation = IndexModel::builder()
            .keys(doc! { "orderId": 1 })
            .options(
                IndexOptions::builder()
                    .name("order_reservation_idx".to_string())
                    .build(),
            )
            .build();
        self.reservations
            .create_indexes([order_reservation], None)
            .await?;

        tracing::info!("Order service indexes initialized");
        Ok(())
    }

    async fn write_batch(
        &self,
        batch: &OrderBatch,
        session: &mut ClientSession,
    ) -> Result<(), StoreError> {
        self.orders
            .insert_one_with_session(&batch.order, None, session)
            .await
            .map_err(map_write_error)?;

        if let Some(reservation) = &batch.reservation {
            self.reservations
                .insert_one_with_session(reservation, None, session)
                .await
                .map_err(map_write_error)?;
        }

        if !batch.cart_cleanup.menu_item_ids.is_empty() {
            let removed = self
                .cart_items
                .delete_many_with_session(
                    doc! {
                        "userId": batch.cart_cleanup.user_id.as_str(),
                        "menuItemId": { "$in": batch.cart_cleanup.menu_item_ids.clone() },
                    },
                    None,
                    session,
                )
                .await?;
            tracing::debug!(
                order_id = %batch.order.id,
                removed = removed.deleted_count,
                "Cart items removed"
            );
        }

        Ok(())
    }

    async fn insert_all(
        &self,
        methods: &[PaymentMethod],
        session: &mut ClientSession,
    ) -> Result<(), StoreError> {
        self.payment_methods
            .insert_many_with_session(methods, None, session)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn abort(session: &mut ClientSession) {
        if let Err(e) = session.abort_transaction().await {
            tracing::warn!(error = %e, "Failed to abort transaction");
        }
    }
}

fn map_write_error(err: mongodb::error::Error) -> StoreError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .as_ref()
            .is_some_and(|errs| errs.iter().any(|e| e.code == DUPLICATE_KEY)),
        _ => false,
    };

    if duplicate {
        StoreError::Duplicate(err.to_string())
    } else {
        StoreError::Database(err)
    }
}

fn status_fields(update: &StatusUpdate) -> Result<Document, StoreError> {
    let mut set = doc! { "updatedAt": DateTime::now() };
    if let Some(status) = update.status {
        set.insert("status", to_bson(&status)?);
    }
    if let Some(payment_status) = update.payment_status {
        set.insert("paymentStatus", to_bson(&payment_status)?);
    }
    if let Some(at) = update.notification_time {
        set.insert("lastNotificationAt", at);
    }
    Ok(set)
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(doc! { "_id": user_id }, None).await?)
    }

    async fn find_payment_method(&self, id: &str) -> Result<Option<PaymentMethod>, StoreError> {
        Ok(self
            .payment_methods
            .find_one(doc! { "_id": id }, None)
            .await?)
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.find_one(doc! { "_id": order_id }, None).await?)
    }

    async fn commit_order(&self, batch: OrderBatch) -> Result<(), StoreError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        if let Err(e) = self.write_batch(&batch, &mut session).await {
            Self::abort(&mut session).await;
            return Err(e);
        }

        session.commit_transaction().await?;
        Ok(())
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        update: StatusUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut filter = doc! { "_id": order_id };
        if let Some(at) = update.notification_time {
            filter.insert(
                "$or",
                vec![
                    doc! { "lastNotificationAt": { "$exists": false } },
                    doc! { "lastNotificationAt": { "$lte": at } },
                ],
            );
        }

        let set = status_fields(&update)?;
        let result = self
            .orders
            .update_one(filter, doc! { "$set": set }, None)
            .await?;

        if result.matched_count > 0 {
            return Ok(UpdateOutcome::Applied);
        }

        // Guard miss or missing document; only the former leaves the order in place.
        if update.notification_time.is_some()
            && self
                .orders
                .count_documents(doc! { "_id": order_id }, None)
                .await?
                > 0
        {
            return Ok(UpdateOutcome::Stale);
        }

        Ok(UpdateOutcome::NotFound)
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, StoreError> {
        let cursor = self.payment_methods.find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_payment_methods(&self, methods: Vec<PaymentMethod>) -> Result<(), StoreError> {
        if let [single] = methods.as_slice() {
            self.payment_methods
                .insert_one(single, None)
                .await
                .map_err(map_write_error)?;
            return Ok(());
        }

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        if let Err(e) = self.insert_all(&methods, &mut session).await {
            Self::abort(&mut session).await;
            return Err(e);
        }

        session.commit_transaction().await?;
        Ok(())
    }

    async fn update_payment_method(
        &self,
        id: &str,
        update: PaymentMethodUpdate,
    ) -> Result<Option<PaymentMethod>, StoreError> {
        let mut set = Document::new();
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(description) = update.description {
            set.insert("description", description);
        }
        if let Some(logo) = update.logo {
            set.insert("logo", logo);
        }
        if let Some(min) = update.minimum_amount {
            set.insert("minimumAmount", min);
        }
        if let Some(max) = update.maximum_amount {
            set.insert("maximumAmount", max);
        }

        if set.is_empty() {
            return self.find_payment_method(id).await;
        }
        set.insert("updatedAt", DateTime::now());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .payment_methods
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await?)
    }

    async fn delete_payment_method(&self, id: &str) -> Result<bool, StoreError> {
        let result = self
            .payment_methods
            .delete_one(doc! { "_id": id }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }
}
