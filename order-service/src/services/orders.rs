//! Order creation: charge first, then commit the order batch atomically.

use std::sync::Arc;

use mongodb::bson::DateTime;
use uuid::Uuid;
use validator::Validate;

use super::charge::ChargeBuilder;
use super::error::OrderError;
use super::gateway::{ChargeResult, PaymentGateway};
use super::metrics;
use super::store::{CartCleanup, OrderBatch, OrderStore, StatusUpdate, UpdateOutcome};
use crate::dtos::{CreateOrderRequest, TableReservationRequest, UpdateOrderRequest};
use crate::models::{
    order::total_of, Order, OrderItem, OrderStatus, OrderType, PaymentMethod, PaymentStatus,
    ReservationStatus, TableReservation,
};

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    charge_builder: ChargeBuilder,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        charge_builder: ChargeBuilder,
    ) -> Self {
        Self {
            store,
            gateway,
            charge_builder,
        }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(user_id = %request.user_id, payment_method_id = %request.payment_method_id)
    )]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        request.validate()?;

        let buyer = self
            .store
            .find_user(&request.user_id)
            .await?
            .ok_or(OrderError::UserNotFound)?;
        let method = self
            .store
            .find_payment_method(&request.payment_method_id)
            .await?
            .ok_or(OrderError::PaymentMethodNotFound)?;

        // The gateway charge is keyed on this id, so it exists before anything else.
        let order_id = Uuid::new_v4().to_string();

        let items: Vec<OrderItem> = request
            .order_items
            .iter()
            .map(|item| OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                menu_item_id: item.menu_item_id.clone(),
                quantity: item.quantity,
                price: item.price,
                total: item.total,
                special_requests: item.special_requests.clone(),
                menu_item: item.menu_item.clone(),
            })
            .collect();

        if let Some(line) = items.iter().find(|item| !item.total_matches_price()) {
            return Err(OrderError::Validation(format!(
                "line total {} for menu item {} does not equal price {} x quantity {}",
                line.total, line.menu_item_id, line.price, line.quantity
            )));
        }

        let total_amount = total_of(&items)
            .ok_or_else(|| OrderError::Validation("order total is out of range".to_string()))?;
        check_amount(&method, total_amount)?;

        let charge = self
            .charge_builder
            .build(&order_id, total_amount, &buyer, &method, &items)?;

        let charged = match self.gateway.charge(&charge).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "Payment charge failed, order not created");
                metrics::record_charge_failure();
                return Err(e.into());
            }
        };

        tracing::info!(
            order_id = %order_id,
            total_amount,
            payment_type = %charge.payment.payment_type(),
            "Payment charge created"
        );

        let batch = assemble_batch(&request, order_id.clone(), items, total_amount, charged);
        let order = batch.order.clone();

        if let Err(e) = self.store.commit_order(batch).await {
            tracing::error!(
                critical = true,
                order_id = %order_id,
                user_id = %request.user_id,
                total_amount,
                error = %e,
                "Payment was charged but the order could not be saved; manual reconciliation required"
            );
            metrics::record_persist_critical();
            return Err(OrderError::PaymentNotRecorded {
                order_id,
                source: e,
            });
        }

        metrics::record_order_created(order.order_type.as_str());
        tracing::info!(order_id = %order.id, "Order created");

        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        self.store
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// Partial status update. With neither field present this is a plain read.
    pub async fn update_order(
        &self,
        order_id: &str,
        request: UpdateOrderRequest,
    ) -> Result<Order, OrderError> {
        let update = StatusUpdate {
            status: request.order_status,
            payment_status: request.payment_status,
            notification_time: None,
        };

        if update.is_empty() {
            return self.get_order(order_id).await;
        }

        match self.store.update_order_status(order_id, update).await? {
            UpdateOutcome::NotFound => Err(OrderError::OrderNotFound),
            UpdateOutcome::Applied | UpdateOutcome::Stale => {
                tracing::info!(order_id = %order_id, "Order status updated");
                self.get_order(order_id).await
            }
        }
    }
}

fn check_amount(method: &PaymentMethod, total: i64) -> Result<(), OrderError> {
    if total <= 0 {
        return Err(OrderError::Validation(
            "order total must be greater than zero".to_string(),
        ));
    }
    if !method.accepts_amount(total) {
        return Err(OrderError::Validation(format!(
            "order total {} is outside the limits of payment method {}",
            total, method.id
        )));
    }
    Ok(())
}

fn assemble_batch(
    request: &CreateOrderRequest,
    order_id: String,
    items: Vec<OrderItem>,
    total_amount: i64,
    charged: ChargeResult,
) -> OrderBatch {
    let now = DateTime::now();

    let reservation = match (&request.order_type, &request.table_reservation) {
        (OrderType::DineIn, Some(details)) => {
            Some(new_reservation(&request.user_id, &order_id, details, now))
        }
        _ => None,
    };

    let cart_cleanup = CartCleanup {
        user_id: request.user_id.clone(),
        menu_item_ids: items.iter().map(|i| i.menu_item_id.clone()).collect(),
    };

    let order = Order {
        id: order_id,
        user_id: request.user_id.clone(),
        payment_method_id: request.payment_method_id.clone(),
        order_type: request.order_type,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        total_amount,
        order_date: now,
        estimated_ready_time: request.estimated_ready_time.map(DateTime::from_chrono),
        special_instructions: request.special_instructions.clone(),
        order_items: items,
        table_reservation_id: reservation.as_ref().map(|r| r.id.clone()),
        payment_code: charged.payment_code(),
        payment_display_url: charged.display_url(),
        payment_expiry: charged.expiry().map(DateTime::from_chrono),
        payment_details_raw: Some(charged.raw),
        last_notification_at: None,
        created_at: now,
        updated_at: now,
    };

    OrderBatch {
        order,
        reservation,
        cart_cleanup,
    }
}

fn new_reservation(
    user_id: &str,
    order_id: &str,
    details: &TableReservationRequest,
    now: DateTime,
) -> TableReservation {
    TableReservation {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        table_id: details.table_id.clone(),
        order_id: order_id.to_string(),
        reservation_time: DateTime::from_chrono(details.reservation_time),
        status: ReservationStatus::Reserved,
        table: details.table.clone(),
        created_at: now,
        updated_at: now,
    }
}
