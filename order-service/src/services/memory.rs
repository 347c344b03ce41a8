//! In-process store used by the test suite and for running without MongoDB.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mongodb::bson::DateTime;
use tokio::sync::RwLock;

use super::store::{
    OrderBatch, OrderStore, PaymentMethodUpdate, StatusUpdate, StoreError, UpdateOutcome,
};
use crate::models::{CartItem, Order, PaymentMethod, TableReservation, User};

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, User>,
    payment_methods: HashMap<String, PaymentMethod>,
    orders: HashMap<String, Order>,
    reservations: HashMap<String, TableReservation>,
    cart_items: HashMap<String, CartItem>,
}

/// All collections sit behind one lock, so every write is atomic.
#[derive(Default)]
pub struct InMemoryOrderStore {
    state: RwLock<MemoryState>,
    fail_commits: AtomicBool,
    fail_updates: AtomicBool,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, user: User) {
        self.state.write().await.users.insert(user.id.clone(), user);
    }

    pub async fn seed_payment_method(&self, method: PaymentMethod) {
        self.state
            .write()
            .await
            .payment_methods
            .insert(method.id.clone(), method);
    }

    pub async fn seed_cart_item(&self, item: CartItem) {
        self.state
            .write()
            .await
            .cart_items
            .insert(item.id.clone(), item);
    }

    pub async fn seed_order(&self, order: Order) {
        self.state
            .write()
            .await
            .orders
            .insert(order.id.clone(), order);
    }

    /// Make every subsequent `commit_order` fail without writing anything.
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `update_order_status` fail without writing anything.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    pub async fn reservations_for_order(&self, order_id: &str) -> Vec<TableReservation> {
        self.state
            .read()
            .await
            .reservations
            .values()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect()
    }

    pub async fn cart_items_for_user(&self, user_id: &str) -> Vec<CartItem> {
        let mut items: Vec<CartItem> = self
            .state
            .read()
            .await
            .cart_items
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn find_payment_method(&self, id: &str) -> Result<Option<PaymentMethod>, StoreError> {
        Ok(self.state.read().await.payment_methods.get(id).cloned())
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.state.read().await.orders.get(order_id).cloned())
    }

    async fn commit_order(&self, batch: OrderBatch) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Aborted("commit failure injected".to_string()));
        }
        if state.orders.contains_key(&batch.order.id) {
            return Err(StoreError::Duplicate(format!("order {}", batch.order.id)));
        }
        if let Some(reservation) = &batch.reservation {
            if state.reservations.contains_key(&reservation.id) {
                return Err(StoreError::Duplicate(format!(
                    "reservation {}",
                    reservation.id
                )));
            }
        }

        // All checks passed; nothing below can fail.
        let cleanup = &batch.cart_cleanup;
        state.cart_items.retain(|_, item| {
            !(item.user_id == cleanup.user_id && cleanup.menu_item_ids.contains(&item.menu_item_id))
        });
        if let Some(reservation) = batch.reservation {
            state.reservations.insert(reservation.id.clone(), reservation);
        }
        state.orders.insert(batch.order.id.clone(), batch.order);

        Ok(())
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        update: StatusUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut state = self.state.write().await;

        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Aborted("status update failure injected".to_string()));
        }
        let Some(order) = state.orders.get_mut(order_id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if let (Some(incoming), Some(recorded)) =
            (update.notification_time, order.last_notification_at)
        {
            if incoming < recorded {
                return Ok(UpdateOutcome::Stale);
            }
        }

        if let Some(status) = update.status {
            order.status = status;
        }
        if let Some(payment_status) = update.payment_status {
            order.payment_status = payment_status;
        }
        if let Some(at) = update.notification_time {
            order.last_notification_at = Some(at);
        }
        order.updated_at = DateTime::now();

        Ok(UpdateOutcome::Applied)
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, StoreError> {
        let mut methods: Vec<PaymentMethod> = self
            .state
            .read()
            .await
            .payment_methods
            .values()
            .cloned()
            .collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(methods)
    }

    async fn insert_payment_methods(&self, methods: Vec<PaymentMethod>) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        for (i, method) in methods.iter().enumerate() {
            let repeated = methods[..i].iter().any(|m| m.id == method.id);
            if repeated || state.payment_methods.contains_key(&method.id) {
                return Err(StoreError::Duplicate(format!("payment method {}", method.id)));
            }
        }

        for method in methods {
            state.payment_methods.insert(method.id.clone(), method);
        }
        Ok(())
    }

    async fn update_payment_method(
        &self,
        id: &str,
        update: PaymentMethodUpdate,
    ) -> Result<Option<PaymentMethod>, StoreError> {
        let mut state = self.state.write().await;
        let Some(method) = state.payment_methods.get_mut(id) else {
            return Ok(None);
        };

        let mut changed = false;
        if let Some(name) = update.name {
            method.name = name;
            changed = true;
        }
        if let Some(description) = update.description {
            method.description = description;
            changed = true;
        }
        if let Some(logo) = update.logo {
            method.logo = Some(logo);
            changed = true;
        }
        if let Some(min) = update.minimum_amount {
            method.minimum_amount = min;
            changed = true;
        }
        if let Some(max) = update.maximum_amount {
            method.maximum_amount = max;
            changed = true;
        }
        if changed {
            method.updated_at = DateTime::now();
        }

        Ok(Some(method.clone()))
    }

    async fn delete_payment_method(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.state.write().await.payment_methods.remove(id).is_some())
    }
}
