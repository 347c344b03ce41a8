//! Persistence seam for orders, reservations, carts and payment methods.

use async_trait::async_trait;
use mongodb::bson::DateTime;
use thiserror::Error;

use crate::models::{Order, OrderStatus, PaymentMethod, PaymentStatus, TableReservation, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    #[error("Transaction aborted: {0}")]
    Aborted(String),

    #[error("Duplicate key: {0}")]
    Duplicate(String),
}

/// Cart lines to remove once the order is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct CartCleanup {
    pub user_id: String,
    pub menu_item_ids: Vec<String>,
}

/// Everything an order creation writes. Committed all-or-nothing.
#[derive(Debug, Clone)]
pub struct OrderBatch {
    pub order: Order,
    pub reservation: Option<TableReservation>,
    pub cart_cleanup: CartCleanup,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Gateway time of the notification driving this update. When set, the
    /// update only applies if no newer notification has been recorded.
    pub notification_time: Option<DateTime>,
}

impl StatusUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    NotFound,
    /// A newer notification was already applied.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentMethodUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub minimum_amount: Option<i64>,
    pub maximum_amount: Option<i64>,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    async fn find_payment_method(&self, id: &str) -> Result<Option<PaymentMethod>, StoreError>;

    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, StoreError>;

    /// Write the order, its reservation (if any) and delete the buyer's
    /// purchased cart lines atomically.
    async fn commit_order(&self, batch: OrderBatch) -> Result<(), StoreError>;

    /// Set the given fields plus `updatedAt`. Never creates the order.
    async fn update_order_status(
        &self,
        order_id: &str,
        update: StatusUpdate,
    ) -> Result<UpdateOutcome, StoreError>;

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, StoreError>;

    async fn insert_payment_methods(&self, methods: Vec<PaymentMethod>) -> Result<(), StoreError>;

    async fn update_payment_method(
        &self,
        id: &str,
        update: PaymentMethodUpdate,
    ) -> Result<Option<PaymentMethod>, StoreError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_payment_method(&self, id: &str) -> Result<bool, StoreError>;
}
