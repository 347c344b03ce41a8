//! Applies verified Midtrans notifications to orders.

use std::sync::Arc;

use mongodb::bson::DateTime;

use super::error::OrderError;
use super::metrics;
use super::signature::SignatureVerifier;
use super::store::{OrderStore, StatusUpdate, UpdateOutcome};
use crate::dtos::MidtransNotification;
use crate::models::{OrderStatus, PaymentStatus};
use crate::utils::parse_gateway_time;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Capture,
    Settlement,
    Pending,
    Deny,
    Cancel,
    Expire,
    Other(String),
}

impl From<&str> for TransactionStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "capture" => Self::Capture,
            "settlement" => Self::Settlement,
            "pending" => Self::Pending,
            "deny" => Self::Deny,
            "cancel" => Self::Cancel,
            "expire" => Self::Expire,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudStatus {
    Accept,
    Challenge,
    Other(String),
}

impl From<&str> for FraudStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "accept" => Self::Accept,
            "challenge" => Self::Challenge,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply {
        payment_status: PaymentStatus,
        /// `None` leaves the order status as it is.
        order_status: Option<OrderStatus>,
    },
    Ignore,
}

/// Gateway status vocabulary to (payment status, order status).
/// Depends only on the notification, never on the current order.
pub fn transition(transaction: &TransactionStatus, fraud: &FraudStatus) -> Transition {
    use Transition::Apply;

    match (transaction, fraud) {
        (TransactionStatus::Capture, FraudStatus::Accept) => Apply {
            payment_status: PaymentStatus::Success,
            order_status: Some(OrderStatus::Confirmed),
        },
        (TransactionStatus::Capture, FraudStatus::Challenge) => Apply {
            payment_status: PaymentStatus::Challenge,
            order_status: None,
        },
        (TransactionStatus::Capture, FraudStatus::Other(_)) => Transition::Ignore,
        (TransactionStatus::Settlement, _) => Apply {
            payment_status: PaymentStatus::Success,
            order_status: Some(OrderStatus::Confirmed),
        },
        (TransactionStatus::Pending, _) => Apply {
            payment_status: PaymentStatus::Pending,
            order_status: Some(OrderStatus::Pending),
        },
        (TransactionStatus::Deny, _) => Apply {
            payment_status: PaymentStatus::Deny,
            order_status: Some(OrderStatus::Cancelled),
        },
        (TransactionStatus::Cancel | TransactionStatus::Expire, _) => Apply {
            payment_status: PaymentStatus::Failure,
            order_status: Some(OrderStatus::Cancelled),
        },
        (TransactionStatus::Other(_), _) => Transition::Ignore,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Applied,
    Ignored,
    Stale,
    OrderNotFound,
    StoreFailed,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Applied => "applied",
            WebhookOutcome::Ignored => "ignored",
            WebhookOutcome::Stale => "stale",
            WebhookOutcome::OrderNotFound => "not_found",
            WebhookOutcome::StoreFailed => "store_error",
        }
    }
}

#[derive(Clone)]
pub struct WebhookReconciler {
    store: Arc<dyn OrderStore>,
    verifier: SignatureVerifier,
}

impl WebhookReconciler {
    pub fn new(store: Arc<dyn OrderStore>, verifier: SignatureVerifier) -> Self {
        Self { store, verifier }
    }

    /// Verify and apply one notification.
    ///
    /// Only a bad signature is an error. Everything after verification is
    /// reported as an outcome so the gateway always gets an acknowledgment.
    #[tracing::instrument(
        skip(self, notification),
        fields(order_id = %notification.order_id, transaction_status = %notification.transaction_status)
    )]
    pub async fn process(
        &self,
        notification: &MidtransNotification,
    ) -> Result<WebhookOutcome, OrderError> {
        if !self.verifier.verify(notification) {
            tracing::warn!("Rejected notification with invalid signature");
            metrics::record_webhook("unauthorized");
            return Err(OrderError::InvalidSignature);
        }

        let outcome = self.apply(notification).await;
        metrics::record_webhook(outcome.as_str());
        Ok(outcome)
    }

    async fn apply(&self, notification: &MidtransNotification) -> WebhookOutcome {
        let transaction = TransactionStatus::from(notification.transaction_status.as_str());
        let fraud = FraudStatus::from(notification.fraud_status.as_deref().unwrap_or(""));

        let (payment_status, order_status) = match transition(&transaction, &fraud) {
            Transition::Apply {
                payment_status,
                order_status,
            } => (payment_status, order_status),
            Transition::Ignore => {
                tracing::info!(
                    fraud_status = ?notification.fraud_status,
                    "Unmapped notification status, no change applied"
                );
                return WebhookOutcome::Ignored;
            }
        };

        let notification_time = parse_gateway_time(&notification.transaction_time)
            .map(DateTime::from_chrono);
        if notification_time.is_none() {
            tracing::debug!(
                transaction_time = %notification.transaction_time,
                "Notification time unreadable, applying without ordering guard"
            );
        }

        let update = StatusUpdate {
            status: order_status,
            payment_status: Some(payment_status),
            notification_time,
        };

        match self
            .store
            .update_order_status(&notification.order_id, update)
            .await
        {
            Ok(UpdateOutcome::Applied) => {
                tracing::info!(
                    payment_status = ?payment_status,
                    order_status = ?order_status,
                    "Order updated from notification"
                );
                WebhookOutcome::Applied
            }
            Ok(UpdateOutcome::Stale) => {
                tracing::info!("Older notification than the last applied one, skipped");
                WebhookOutcome::Stale
            }
            Ok(UpdateOutcome::NotFound) => {
                // The create-order commit may not be visible yet; the gateway can resend.
                tracing::warn!(retryable = true, "Notification for unknown order");
                WebhookOutcome::OrderNotFound
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to apply notification");
                WebhookOutcome::StoreFailed
            }
        }
    }
}
