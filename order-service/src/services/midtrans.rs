//! Midtrans Core API client.
//!
//! Only the charge endpoint is used. Authentication is HTTP Basic with the
//! server key as username and an empty password.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;

use super::charge::ChargeRequest;
use super::gateway::{ChargeResult, GatewayError, PaymentGateway};
use crate::config::MidtransConfig;

#[derive(Clone)]
pub struct MidtransClient {
    client: Client,
    config: MidtransConfig,
}

impl MidtransClient {
    pub fn new(config: MidtransConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.server_key.expose_secret().trim().is_empty()
    }

    fn charge_url(&self) -> String {
        format!("{}/v2/charge", self.config.api_base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PaymentGateway for MidtransClient {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResult, GatewayError> {
        if !self.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let response = self
            .client
            .post(self.charge_url())
            .basic_auth(self.config.server_key.expose_secret(), Some(""))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(
            status = %status,
            order_id = %request.transaction_details.order_id,
            "Midtrans charge response"
        );

        let raw: Value = serde_json::from_str(&body).map_err(|e| {
            GatewayError::InvalidResponse(format!("HTTP {}: {}", status.as_u16(), e))
        })?;

        let result = ChargeResult::from_value(raw);

        if !status.is_success() {
            // Error bodies normally carry their own status_code; fall back to HTTP.
            return match result {
                Err(err @ GatewayError::Rejected { .. }) => Err(err),
                _ => Err(GatewayError::Rejected {
                    status_code: status.as_u16().to_string(),
                    message: body,
                }),
            };
        }

        let result = result?;
        tracing::info!(
            order_id = %request.transaction_details.order_id,
            transaction_id = %result.response.transaction_id,
            payment_type = %result.response.payment_type,
            "Midtrans charge created"
        );
        Ok(result)
    }
}
