use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{
    BulkCreatePaymentMethodsRequest, CreatePaymentMethodRequest, PaymentMethodResponse,
    UpdatePaymentMethodRequest,
};
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn create_payment_method(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreatePaymentMethodRequest>,
) -> Result<(StatusCode, Json<PaymentMethodResponse>), AppError> {
    let method = state.payment_methods.create(req).await?;
    Ok((StatusCode::CREATED, Json(method.into())))
}

pub async fn create_payment_methods_bulk(
    State(state): State<AppState>,
    Json(req): Json<BulkCreatePaymentMethodsRequest>,
) -> Result<(StatusCode, Json<Vec<PaymentMethodResponse>>), AppError> {
    let methods = state.payment_methods.create_bulk(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(methods.into_iter().map(Into::into).collect()),
    ))
}

pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMethodResponse>>, AppError> {
    let methods = state.payment_methods.list().await?;
    Ok(Json(methods.into_iter().map(Into::into).collect()))
}

pub async fn get_payment_method(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentMethodResponse>, AppError> {
    let method = state.payment_methods.get(&id).await?;
    Ok(Json(method.into()))
}

pub async fn update_payment_method(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdatePaymentMethodRequest>,
) -> Result<Json<PaymentMethodResponse>, AppError> {
    let method = state.payment_methods.update(&id, req).await?;
    Ok(Json(method.into()))
}

pub async fn delete_payment_method(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.payment_methods.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
