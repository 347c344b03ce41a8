//! Midtrans Core API charge request construction.
//!
//! Maps an order and its payment method onto the `/v2/charge` body. The
//! payment-type block is a tagged enum so each variant carries exactly the
//! fields Midtrans requires for it.

use serde::Serialize;
use thiserror::Error;

use crate::models::{OrderItem, PaymentMethod, PaymentMethodType, User};

/// Midtrans rejects item names longer than this.
const MAX_ITEM_NAME_LEN: usize = 50;

#[derive(Debug, Error, PartialEq)]
pub enum ChargeBuildError {
    #[error("Payment method {payment_method_id} ({method_type:?}) has no Midtrans identifier")]
    MissingIdentifier {
        payment_method_id: String,
        method_type: PaymentMethodType,
    },

    #[error("Payment method type {0:?} cannot be charged through the gateway")]
    UnsupportedType(PaymentMethodType),

    #[error("Unsupported e-wallet: {0}")]
    UnsupportedEWallet(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChargeRequest {
    #[serde(flatten)]
    pub payment: PaymentDetails,
    pub transaction_details: TransactionDetails,
    pub customer_details: CustomerDetails,
    pub item_details: Vec<ItemDetails>,
}

/// Payment-type specific part of a charge.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "payment_type")]
pub enum PaymentDetails {
    #[serde(rename = "bank_transfer")]
    BankTransfer { bank_transfer: BankTransfer },
    #[serde(rename = "gopay")]
    Gopay,
    #[serde(rename = "shopeepay")]
    Shopeepay { shopeepay: ShopeePay },
    #[serde(rename = "qris")]
    Qris { qris: Qris },
    #[serde(rename = "cstore")]
    ConvenienceStore { cstore: ConvenienceStore },
}

impl PaymentDetails {
    pub fn payment_type(&self) -> &'static str {
        match self {
            PaymentDetails::BankTransfer { .. } => "bank_transfer",
            PaymentDetails::Gopay => "gopay",
            PaymentDetails::Shopeepay { .. } => "shopeepay",
            PaymentDetails::Qris { .. } => "qris",
            PaymentDetails::ConvenienceStore { .. } => "cstore",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BankTransfer {
    pub bank: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShopeePay {
    pub callback_url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Qris {
    pub acquirer: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConvenienceStore {
    pub store: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemDetails {
    pub id: String,
    pub price: i64,
    pub quantity: i32,
    pub name: String,
}

/// Builds charge requests. Pure: no I/O, same output for the same input.
#[derive(Debug, Clone)]
pub struct ChargeBuilder {
    shopeepay_callback_url: String,
}

impl ChargeBuilder {
    pub fn new(shopeepay_callback_url: impl Into<String>) -> Self {
        Self {
            shopeepay_callback_url: shopeepay_callback_url.into(),
        }
    }

    pub fn build(
        &self,
        order_id: &str,
        total_amount: i64,
        buyer: &User,
        method: &PaymentMethod,
        items: &[OrderItem],
    ) -> Result<ChargeRequest, ChargeBuildError> {
        let payment = self.payment_details(method)?;

        let item_details = items
            .iter()
            .map(|item| ItemDetails {
                id: item.menu_item_id.clone(),
                price: item.price,
                quantity: item.quantity,
                name: item.display_name().chars().take(MAX_ITEM_NAME_LEN).collect(),
            })
            .collect();

        Ok(ChargeRequest {
            payment,
            transaction_details: TransactionDetails {
                order_id: order_id.to_string(),
                gross_amount: total_amount,
            },
            customer_details: CustomerDetails {
                first_name: buyer.username.clone(),
                last_name: buyer.username.clone(),
                email: buyer.email.clone(),
                phone: buyer.phone_number.clone(),
            },
            item_details,
        })
    }

    fn payment_details(&self, method: &PaymentMethod) -> Result<PaymentDetails, ChargeBuildError> {
        if !method.payment_method_type.routes_through_gateway() {
            return Err(ChargeBuildError::UnsupportedType(
                method.payment_method_type,
            ));
        }

        let identifier = method
            .gateway_identifier()
            .ok_or_else(|| ChargeBuildError::MissingIdentifier {
                payment_method_id: method.id.clone(),
                method_type: method.payment_method_type,
            })?
            .to_string();

        let details = match method.payment_method_type {
            PaymentMethodType::VirtualAccount => PaymentDetails::BankTransfer {
                bank_transfer: BankTransfer {
                    bank: identifier.to_lowercase(),
                },
            },
            PaymentMethodType::EWallet => match identifier.to_lowercase().as_str() {
                "gopay" => PaymentDetails::Gopay,
                "shopeepay" => PaymentDetails::Shopeepay {
                    shopeepay: ShopeePay {
                        callback_url: self.shopeepay_callback_url.clone(),
                    },
                },
                _ => return Err(ChargeBuildError::UnsupportedEWallet(identifier)),
            },
            PaymentMethodType::QrCode => PaymentDetails::Qris {
                qris: Qris {
                    acquirer: identifier,
                },
            },
            PaymentMethodType::OverTheCounter => PaymentDetails::ConvenienceStore {
                cstore: ConvenienceStore { store: identifier },
            },
            other => return Err(ChargeBuildError::UnsupportedType(other)),
        };

        Ok(details)
    }
}
