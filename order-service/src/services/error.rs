use service_core::error::AppError;
use thiserror::Error;

use super::charge::ChargeBuildError;
use super::gateway::GatewayError;
use super::store::StoreError;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    InvalidRequest(#[from] validator::ValidationErrors),

    #[error("User not found")]
    UserNotFound,

    #[error("Payment method not found")]
    PaymentMethodNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error(transparent)]
    Charge(#[from] ChargeBuildError),

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The gateway charge exists but the order batch was not committed.
    #[error("Payment {order_id} was charged but the order could not be saved")]
    PaymentNotRecorded {
        order_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Invalid notification signature")]
    InvalidSignature,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            OrderError::InvalidRequest(e) => AppError::ValidationError(e),
            OrderError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            OrderError::PaymentMethodNotFound => {
                AppError::NotFound(anyhow::anyhow!("Payment method not found"))
            }
            OrderError::OrderNotFound => AppError::NotFound(anyhow::anyhow!("Order not found")),
            OrderError::Charge(e) => AppError::BadRequest(anyhow::Error::new(e)),
            OrderError::Gateway(e) => AppError::BadGateway(e.to_string()),
            e @ OrderError::PaymentNotRecorded { .. } => AppError::Critical(anyhow::Error::new(e)),
            OrderError::InvalidSignature => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid signature"))
            }
            OrderError::Store(StoreError::Duplicate(msg)) => {
                AppError::Conflict(anyhow::anyhow!("Already exists: {}", msg))
            }
            OrderError::Store(e) => AppError::DatabaseError(anyhow::Error::new(e)),
        }
    }
}
