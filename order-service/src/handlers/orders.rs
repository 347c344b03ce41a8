use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{CreateOrderRequest, OrderResponse, UpdateOrderRequest};
use crate::utils::ValidatedJson;
use crate::AppState;

/// Charge the buyer through the gateway and record the order.
pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let order = state.orders.create_order(req).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.get_order(&order_id).await?;
    Ok(Json(order.into()))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.update_order(&order_id, req).await?;
    Ok(Json(order.into()))
}
