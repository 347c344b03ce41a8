use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::charge::{ChargeRequest, PaymentDetails};
use crate::utils::{format_gateway_time, parse_gateway_time};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Charge rejected by gateway ({status_code}): {message}")]
    Rejected {
        status_code: String,
        message: String,
    },

    #[error("Gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Gateway credentials not configured")]
    NotConfigured,
}

/// Issues charges against a payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submit exactly one charge. Implementations never retry.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResult, GatewayError>;
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VaNumber {
    pub bank: String,
    pub va_number: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GatewayAction {
    pub name: String,
    #[serde(default)]
    pub method: String,
    pub url: String,
}

/// The parts of a Midtrans charge response this service reads.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChargeResponse {
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub transaction_status: String,
    #[serde(default)]
    pub va_numbers: Vec<VaNumber>,
    #[serde(default)]
    pub permata_va_number: Option<String>,
    #[serde(default)]
    pub payment_code: Option<String>,
    #[serde(default)]
    pub actions: Vec<GatewayAction>,
    #[serde(default)]
    pub expiry_time: Option<String>,
}

/// A successful charge: the typed view plus the untouched response body.
#[derive(Debug, Clone)]
pub struct ChargeResult {
    pub response: ChargeResponse,
    pub raw: Value,
}

/// Action names that carry something the buyer must open or scan.
const DISPLAY_ACTIONS: [&str; 2] = ["generate-qr-code", "deeplink-redirect"];

impl ChargeResult {
    /// Interpret a decoded response body. Midtrans answers HTTP 200 even for
    /// rejected charges, so acceptance is decided by the body's `status_code`.
    pub fn from_value(raw: Value) -> Result<Self, GatewayError> {
        let response: ChargeResponse = serde_json::from_value(raw.clone())
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        match response.status_code.as_str() {
            "200" | "201" => Ok(Self { response, raw }),
            "" => Err(GatewayError::InvalidResponse(
                "response has no status_code".to_string(),
            )),
            _ => Err(GatewayError::Rejected {
                status_code: response.status_code.clone(),
                message: response.status_message.clone(),
            }),
        }
    }

    /// Virtual account number first, then the Permata VA, then the counter code.
    pub fn payment_code(&self) -> Option<String> {
        let va = self
            .response
            .va_numbers
            .first()
            .map(|v| v.va_number.as_str());

        [
            va,
            self.response.permata_va_number.as_deref(),
            self.response.payment_code.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|code| !code.is_empty())
        .map(str::to_string)
    }

    pub fn display_url(&self) -> Option<String> {
        self.response
            .actions
            .iter()
            .find(|action| DISPLAY_ACTIONS.contains(&action.name.as_str()))
            .map(|action| action.url.clone())
    }

    /// `None` when the gateway omitted the expiry or sent something unparsable.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.response
            .expiry_time
            .as_deref()
            .and_then(parse_gateway_time)
    }
}

/// In-process gateway for tests and local runs.
#[derive(Default)]
pub struct MockPaymentGateway {
    calls: AtomicU64,
    reject: AtomicBool,
    fail_transport: AtomicBool,
    last_request: Mutex<Option<ChargeRequest>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make subsequent charges come back with a non-success `status_code`.
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// Make subsequent charges fail with a transport-style error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.fail_transport.store(unreachable, Ordering::SeqCst);
    }

    pub fn last_request(&self) -> Option<ChargeRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn response_for(request: &ChargeRequest) -> Value {
        let order_id = &request.transaction_details.order_id;
        let expiry = format_gateway_time(Utc::now() + chrono::Duration::hours(24));
        let mut body = json!({
            "status_code": "201",
            "status_message": "Success, transaction is created",
            "transaction_id": format!("mock-{}", order_id),
            "order_id": order_id,
            "gross_amount": format!("{}.00", request.transaction_details.gross_amount),
            "payment_type": request.payment.payment_type(),
            "transaction_status": "pending",
            "transaction_time": format_gateway_time(Utc::now()),
            "expiry_time": expiry,
        });

        match &request.payment {
            PaymentDetails::BankTransfer { bank_transfer } => {
                body["va_numbers"] = json!([{
                    "bank": bank_transfer.bank,
                    "va_number": "8808123456789012",
                }]);
            }
            PaymentDetails::Gopay | PaymentDetails::Shopeepay { .. } => {
                body["actions"] = json!([{
                    "name": "deeplink-redirect",
                    "method": "GET",
                    "url": format!("https://mock.gateway/deeplink/{}", order_id),
                }]);
            }
            PaymentDetails::Qris { .. } => {
                body["actions"] = json!([{
                    "name": "generate-qr-code",
                    "method": "GET",
                    "url": format!("https://mock.gateway/qr/{}", order_id),
                }]);
            }
            PaymentDetails::ConvenienceStore { .. } => {
                body["payment_code"] = json!("MOCK-STORE-0001");
            }
        }
        body
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResult, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(GatewayError::InvalidResponse(
                "mock gateway unreachable".to_string(),
            ));
        }

        if self.reject.load(Ordering::SeqCst) {
            return ChargeResult::from_value(json!({
                "status_code": "406",
                "status_message": "Duplicate order ID. Order ID has already been utilized previously",
            }));
        }

        ChargeResult::from_value(Self::response_for(request))
    }
}
