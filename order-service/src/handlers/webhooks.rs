//! Midtrans HTTP notification endpoint.
//!
//! Anything that passes the signature check is acknowledged with 200 so the
//! gateway stops retrying, including notifications we could not apply.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{MidtransNotification, WebhookAck};
use crate::services::{metrics, WebhookOutcome};
use crate::AppState;

pub async fn midtrans_notification(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<WebhookAck>), AppError> {
    let body = body.map_err(|e| {
        tracing::error!(error = %e, "Failed to read notification body");
        metrics::record_webhook("unreadable");
        AppError::InternalError(anyhow::anyhow!("Failed to read request body"))
    })?;

    let notification: MidtransNotification = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Malformed notification body");
        metrics::record_webhook("bad_request");
        AppError::BadRequest(anyhow::anyhow!("Invalid notification payload: {}", e))
    })?;

    let outcome = state.reconciler.process(&notification).await?;

    let message = match outcome {
        WebhookOutcome::Applied => "Webhook processed successfully",
        WebhookOutcome::Ignored
        | WebhookOutcome::Stale
        | WebhookOutcome::OrderNotFound
        | WebhookOutcome::StoreFailed => "Webhook received, no action taken",
    };

    Ok((
        StatusCode::OK,
        Json(WebhookAck {
            message: message.to_string(),
        }),
    ))
}
