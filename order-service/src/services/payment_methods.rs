use std::sync::Arc;

use validator::{Validate, ValidationErrors};

use super::error::OrderError;
use super::store::{OrderStore, PaymentMethodUpdate};
use crate::dtos::payment_method::check_amount_bounds;
use crate::dtos::{
    BulkCreatePaymentMethodsRequest, CreatePaymentMethodRequest, UpdatePaymentMethodRequest,
};
use crate::models::PaymentMethod;

/// Catalog of payment methods offered to buyers.
#[derive(Clone)]
pub struct PaymentMethodService {
    store: Arc<dyn OrderStore>,
}

impl PaymentMethodService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        request: CreatePaymentMethodRequest,
    ) -> Result<PaymentMethod, OrderError> {
        request.validate()?;
        let method = request.into_model();
        self.store.insert_payment_methods(vec![method.clone()]).await?;
        tracing::info!(payment_method_id = %method.id, "Payment method created");
        Ok(method)
    }

    /// Inserts every method or none.
    pub async fn create_bulk(
        &self,
        request: BulkCreatePaymentMethodsRequest,
    ) -> Result<Vec<PaymentMethod>, OrderError> {
        if request.methods.is_empty() {
            return Err(OrderError::Validation(
                "at least one payment method is required".to_string(),
            ));
        }
        request.validate()?;

        let methods: Vec<PaymentMethod> = request
            .methods
            .into_iter()
            .map(CreatePaymentMethodRequest::into_model)
            .collect();
        self.store.insert_payment_methods(methods.clone()).await?;
        tracing::info!(count = methods.len(), "Payment methods created");
        Ok(methods)
    }

    pub async fn list(&self) -> Result<Vec<PaymentMethod>, OrderError> {
        Ok(self.store.list_payment_methods().await?)
    }

    pub async fn get(&self, id: &str) -> Result<PaymentMethod, OrderError> {
        self.store
            .find_payment_method(id)
            .await?
            .ok_or(OrderError::PaymentMethodNotFound)
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdatePaymentMethodRequest,
    ) -> Result<PaymentMethod, OrderError> {
        request.validate()?;

        // A single bound is checked against the stored counterpart.
        if request.minimum_amount.is_some() != request.maximum_amount.is_some() {
            let current = self.get(id).await?;
            let minimum = request.minimum_amount.unwrap_or(current.minimum_amount);
            let maximum = request.maximum_amount.unwrap_or(current.maximum_amount);
            if let Err(err) = check_amount_bounds(minimum, maximum) {
                let mut errors = ValidationErrors::new();
                errors.add("__all__", err);
                return Err(OrderError::InvalidRequest(errors));
            }
        }

        self.store
            .update_payment_method(id, PaymentMethodUpdate::from(request))
            .await?
            .ok_or(OrderError::PaymentMethodNotFound)
    }

    pub async fn delete(&self, id: &str) -> Result<(), OrderError> {
        if !self.store.delete_payment_method(id).await? {
            return Err(OrderError::PaymentMethodNotFound);
        }
        tracing::info!(payment_method_id = %id, "Payment method deleted");
        Ok(())
    }
}
