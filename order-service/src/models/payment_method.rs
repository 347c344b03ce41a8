use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethodType {
    Cash,
    Card,
    DirectDebit,
    OverTheCounter,
    QrCode,
    VirtualAccount,
    EWallet,
    Echannel,
}

impl PaymentMethodType {
    /// Types charged through Midtrans by this service. Each needs a
    /// `midtransIdentifier` (bank, e-wallet, acquirer or store).
    pub fn routes_through_gateway(&self) -> bool {
        matches!(
            self,
            PaymentMethodType::VirtualAccount
                | PaymentMethodType::EWallet
                | PaymentMethodType::QrCode
                | PaymentMethodType::OverTheCounter
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub payment_method_type: PaymentMethodType,
    /// Bank code, e-wallet name, QRIS acquirer or store code.
    #[serde(default)]
    pub midtrans_identifier: Option<String>,
    /// Zero means no lower bound.
    #[serde(default)]
    pub minimum_amount: i64,
    /// Zero means no upper bound.
    #[serde(default)]
    pub maximum_amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_payment_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_payment_qr_code_picture: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl PaymentMethod {
    /// The gateway identifier, ignoring blank strings.
    pub fn gateway_identifier(&self) -> Option<&str> {
        self.midtrans_identifier
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn accepts_amount(&self, amount: i64) -> bool {
        let above_min = self.minimum_amount <= 0 || amount >= self.minimum_amount;
        let below_max = self.maximum_amount <= 0 || amount <= self.maximum_amount;
        above_min && below_max
    }
}
