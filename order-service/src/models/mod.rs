//! Persisted documents.
//!
//! Field names are camelCase on disk so the collections stay compatible with
//! documents written by the mobile app.

pub mod order;
pub mod payment_method;
pub mod reservation;
pub mod user;

pub use order::{
    Category, DenormalizedMenuItem, Order, OrderItem, OrderStatus, OrderType, PaymentStatus,
};
pub use payment_method::{PaymentMethod, PaymentMethodType};
pub use reservation::{Location, ReservationStatus, RestaurantTable, TableReservation};
pub use user::{CartItem, Role, User};
