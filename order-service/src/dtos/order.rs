use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    DenormalizedMenuItem, Order, OrderItem, OrderStatus, OrderType, PaymentStatus,
    RestaurantTable,
};
use crate::utils::flexible_time;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "paymentMethodId is required"))]
    pub payment_method_id: String,
    pub order_type: OrderType,
    #[serde(default, with = "flexible_time::option")]
    pub estimated_ready_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub table_reservation: Option<TableReservationRequest>,
    #[validate(length(min = 1, message = "at least one order item is required"), nested)]
    pub order_items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[validate(length(min = 1, message = "menuItemId is required"))]
    pub menu_item_id: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    #[validate(range(min = 0, message = "total must not be negative"))]
    pub total: i64,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub menu_item: Option<DenormalizedMenuItem>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TableReservationRequest {
    #[validate(length(min = 1, message = "tableId is required"))]
    pub table_id: String,
    #[serde(with = "flexible_time")]
    pub reservation_time: DateTime<Utc>,
    #[serde(default)]
    pub table: Option<RestaurantTable>,
}

/// Partial status change. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[serde(default, alias = "status")]
    pub order_status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub payment_method_id: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: i64,
    pub order_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_ready_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub order_items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_reservation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_display_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_expiry: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details_raw: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            payment_method_id: order.payment_method_id,
            order_type: order.order_type,
            status: order.status,
            payment_status: order.payment_status,
            total_amount: order.total_amount,
            order_date: order.order_date.to_chrono(),
            estimated_ready_time: order.estimated_ready_time.map(|t| t.to_chrono()),
            special_instructions: order.special_instructions,
            order_items: order.order_items,
            table_reservation_id: order.table_reservation_id,
            payment_code: order.payment_code,
            payment_display_url: order.payment_display_url,
            payment_expiry: order.payment_expiry.map(|t| t.to_chrono()),
            payment_details_raw: order.payment_details_raw,
            created_at: order.created_at.to_chrono(),
            updated_at: order.updated_at.to_chrono(),
        }
    }
}
