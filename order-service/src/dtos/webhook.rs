use serde::{Deserialize, Serialize};

/// Midtrans HTTP notification body. Field names follow the gateway.
///
/// Every field is kept as the raw string so the signature can be recomputed
/// over exactly what was sent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MidtransNotification {
    pub transaction_time: String,
    pub transaction_status: String,
    pub transaction_id: String,
    pub status_message: String,
    pub status_code: String,
    pub signature_key: String,
    pub payment_type: String,
    pub order_id: String,
    pub merchant_id: String,
    pub gross_amount: String,
    pub fraud_status: Option<String>,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub message: String,
}
