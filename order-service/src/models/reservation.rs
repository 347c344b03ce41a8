use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Reserved,
    Occupied,
    Completed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Indoor,
    Outdoor,
    Vip,
}

/// Table snapshot embedded in a reservation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantTable {
    pub id: String,
    pub table_number: String,
    pub capacity: i32,
    #[serde(default)]
    pub is_available: bool,
    pub location: Location,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TableReservation {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub table_id: String,
    pub order_id: String,
    pub reservation_time: DateTime,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<RestaurantTable>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}
