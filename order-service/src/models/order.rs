use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OrderType {
    DineIn,
    TakeAway,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dineIn",
            OrderType::TakeAway => "takeAway",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Challenge,
    Deny,
    Failure,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Menu item copied into the order line when the order is placed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DenormalizedMenuItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i32,
    /// Unit price in the smallest currency unit.
    pub price: i64,
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item: Option<DenormalizedMenuItem>,
}

impl OrderItem {
    /// Display name sent to the gateway, empty when no snapshot was supplied.
    pub fn display_name(&self) -> &str {
        self.menu_item.as_ref().map(|m| m.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub payment_method_id: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Sum of line totals at creation; never recomputed.
    pub total_amount: i64,
    pub order_date: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_ready_time: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_reservation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_display_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_expiry: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details_raw: Option<serde_json::Value>,
    /// Gateway time of the last notification applied to this order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notification_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl OrderItem {
    pub fn total_matches_price(&self) -> bool {
        self.price
            .checked_mul(i64::from(self.quantity))
            .is_some_and(|expected| expected == self.total)
    }
}

/// Sum of line totals, or `None` on overflow.
pub fn total_of(items: &[OrderItem]) -> Option<i64> {
    items
        .iter()
        .try_fold(0i64, |acc, item| acc.checked_add(item.total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(total: i64) -> OrderItem {
        OrderItem {
            id: "i".to_string(),
            order_id: "o".to_string(),
            menu_item_id: "m".to_string(),
            quantity: 1,
            price: total,
            total,
            special_requests: None,
            menu_item: None,
        }
    }

    #[test]
    fn total_is_sum_of_line_totals() {
        assert_eq!(total_of(&[item(15_000), item(22_500), item(0)]), Some(37_500));
        assert_eq!(total_of(&[]), Some(0));
    }

    #[test]
    fn line_total_must_equal_price_times_quantity() {
        let mut line = item(12_000);
        line.quantity = 2;
        assert!(!line.total_matches_price());

        line.total = 24_000;
        assert!(line.total_matches_price());

        line.price = i64::MAX;
        assert!(!line.total_matches_price());
    }

    #[test]
    fn total_overflow_is_detected() {
        assert_eq!(total_of(&[item(i64::MAX), item(1)]), None);
    }

    #[test]
    fn enums_use_app_vocabulary() {
        assert_eq!(serde_json::to_value(OrderType::DineIn).unwrap(), "dineIn");
        assert_eq!(serde_json::to_value(OrderType::TakeAway).unwrap(), "takeAway");
        assert_eq!(serde_json::to_value(OrderStatus::Cancelled).unwrap(), "cancelled");
        assert_eq!(serde_json::to_value(PaymentStatus::Challenge).unwrap(), "challenge");
    }
}
