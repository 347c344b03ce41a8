use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{PaymentMethod, PaymentMethodType};
use crate::services::store::PaymentMethodUpdate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create"))]
pub struct CreatePaymentMethodRequest {
    /// Client-chosen id; a UUID is generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo: Option<String>,
    pub payment_method_type: PaymentMethodType,
    #[serde(default)]
    pub midtrans_identifier: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub minimum_amount: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub maximum_amount: i64,
    #[serde(default)]
    pub admin_payment_code: Option<String>,
    #[serde(default)]
    pub admin_payment_qr_code_picture: Option<String>,
}

fn validate_create(req: &CreatePaymentMethodRequest) -> Result<(), ValidationError> {
    let has_identifier = req
        .midtrans_identifier
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());
    if req.payment_method_type.routes_through_gateway() && !has_identifier {
        let mut err = ValidationError::new("midtrans_identifier_required");
        err.message = Some("midtransIdentifier is required for this payment method type".into());
        return Err(err);
    }
    check_amount_bounds(req.minimum_amount, req.maximum_amount)
}

/// A maximum of 0 means unbounded.
pub fn check_amount_bounds(minimum: i64, maximum: i64) -> Result<(), ValidationError> {
    if maximum > 0 && minimum > maximum {
        let mut err = ValidationError::new("amount_bounds");
        err.message = Some("minimumAmount must not exceed maximumAmount".into());
        return Err(err);
    }
    Ok(())
}

impl CreatePaymentMethodRequest {
    pub fn into_model(self) -> PaymentMethod {
        let now = mongodb::bson::DateTime::now();
        PaymentMethod {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: self.name,
            description: self.description,
            logo: self.logo,
            payment_method_type: self.payment_method_type,
            midtrans_identifier: self.midtrans_identifier,
            minimum_amount: self.minimum_amount,
            maximum_amount: self.maximum_amount,
            admin_payment_code: self.admin_payment_code,
            admin_payment_qr_code_picture: self.admin_payment_qr_code_picture,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An empty list is rejected by the service as a bad request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkCreatePaymentMethodsRequest {
    #[validate(nested)]
    pub methods: Vec<CreatePaymentMethodRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update"))]
pub struct UpdatePaymentMethodRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    #[validate(range(min = 0))]
    pub minimum_amount: Option<i64>,
    #[validate(range(min = 0))]
    pub maximum_amount: Option<i64>,
}

fn validate_update(req: &UpdatePaymentMethodRequest) -> Result<(), ValidationError> {
    match (req.minimum_amount, req.maximum_amount) {
        (Some(minimum), Some(maximum)) => check_amount_bounds(minimum, maximum),
        _ => Ok(()),
    }
}

impl From<UpdatePaymentMethodRequest> for PaymentMethodUpdate {
    fn from(req: UpdatePaymentMethodRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            logo: req.logo,
            minimum_amount: req.minimum_amount,
            maximum_amount: req.maximum_amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub payment_method_type: PaymentMethodType,
    pub midtrans_identifier: Option<String>,
    pub minimum_amount: i64,
    pub maximum_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_payment_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_payment_qr_code_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentMethod> for PaymentMethodResponse {
    fn from(pm: PaymentMethod) -> Self {
        Self {
            id: pm.id,
            name: pm.name,
            description: pm.description,
            logo: pm.logo,
            payment_method_type: pm.payment_method_type,
            midtrans_identifier: pm.midtrans_identifier,
            minimum_amount: pm.minimum_amount,
            maximum_amount: pm.maximum_amount,
            admin_payment_code: pm.admin_payment_code,
            admin_payment_qr_code_picture: pm.admin_payment_qr_code_picture,
            created_at: pm.created_at.to_chrono(),
            updated_at: pm.updated_at.to_chrono(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gateway_type_requires_identifier() {
        let req: CreatePaymentMethodRequest = serde_json::from_value(json!({
            "name": "BCA Virtual Account",
            "paymentMethodType": "virtualAccount",
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let req: CreatePaymentMethodRequest = serde_json::from_value(json!({
            "name": "BCA Virtual Account",
            "paymentMethodType": "virtualAccount",
            "midtransIdentifier": "bca",
        }))
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn cash_needs_no_identifier() {
        let req: CreatePaymentMethodRequest = serde_json::from_value(json!({
            "name": "Cash",
            "paymentMethodType": "cash",
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        let model = req.into_model();
        assert!(!model.id.is_empty());
        assert_eq!(model.midtrans_identifier, None);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let req: CreatePaymentMethodRequest = serde_json::from_value(json!({
            "name": "QRIS",
            "paymentMethodType": "qrCode",
            "midtransIdentifier": "gopay",
            "minimumAmount": 50000,
            "maximumAmount": 1000,
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_with_inverted_bounds_is_rejected() {
        let req: UpdatePaymentMethodRequest = serde_json::from_value(json!({
            "minimumAmount": 50000,
            "maximumAmount": 1000,
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let req: UpdatePaymentMethodRequest = serde_json::from_value(json!({
            "minimumAmount": 50000,
            "maximumAmount": 0,
        }))
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn bulk_validates_each_entry() {
        let req: BulkCreatePaymentMethodsRequest = serde_json::from_value(json!({
            "methods": [
                { "name": "Cash", "paymentMethodType": "cash" },
                { "name": "GoPay", "paymentMethodType": "eWallet" }
            ]
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
