// src/api/orders.rs

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde_json::json;

use crate::api::auth::{require_admin, AuthUser};
use crate::error::ApiError;
use crate::models::{
    generate_order_number, is_valid_email, CreateOrderRequest, OrderStatus,
    UpdateOrderStatusRequest,
};
use crate::{db, AppState};

#[utoipa::path(tag = "orders", request_body = CreateOrderRequest,
    responses((status = 201, description = "Order created"), (status = 400, description = "Validation failure")))]
#[post("/api/orders")]
pub async fn create_order(
    state: web::Data<AppState>,
    payload: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    if payload.items.is_empty() {
        return Err(ApiError::validation("Order must contain at least one item"));
    }
    if payload.customer_name.trim().is_empty() {
        return Err(ApiError::validation("Customer name is required"));
    }
    let customer_email = payload.customer_email.trim().to_lowercase();
    if !is_valid_email(&customer_email) {
        return Err(ApiError::validation("Please provide a valid email"));
    }
    if payload.items.iter().any(|i| i.quantity < 1) {
        return Err(ApiError::validation("Quantity must be at least 1"));
    }

    // assigned exactly once, before the record exists; never regenerated
    let order_number = generate_order_number();
    let order = db::orders::create_order(&state.pool, &payload, &order_number, &customer_email)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ApiError::validation("Order number collision, please retry")
            } else {
                ApiError::Store(e)
            }
        })?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": order,
    })))
}

#[utoipa::path(tag = "orders",
    responses((status = 200, description = "All orders, newest first, items resolved")))]
#[get("/api/orders")]
pub async fn list_orders(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let orders = db::orders::list_orders(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": orders.len(),
        "data": orders,
    })))
}

#[utoipa::path(tag = "orders",
    responses((status = 200, description = "Orders for the customer, newest first")))]
#[get("/api/orders/customer/{email}")]
pub async fn orders_by_customer(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let orders = db::orders::orders_by_customer_email(&state.pool, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": orders.len(),
        "data": orders,
    })))
}

#[utoipa::path(tag = "orders",
    responses((status = 200, description = "The order with resolved items"), (status = 404, description = "Not found")))]
#[get("/api/orders/{id}")]
pub async fn get_order(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let order = db::orders::get_order(&state.pool, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": order,
    })))
}

#[utoipa::path(tag = "orders", request_body = UpdateOrderStatusRequest,
    responses((status = 200, description = "Updated order"), (status = 400, description = "Missing or invalid status"), (status = 404, description = "Not found")))]
#[patch("/api/orders/{id}/status")]
pub async fn update_order_status(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
    payload: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let Some(status) = payload.status.as_deref() else {
        return Err(ApiError::validation("Status is required"));
    };
    // any status may follow any other; only membership is checked
    let status = OrderStatus::parse(status)
        .ok_or_else(|| ApiError::validation(format!("{status} is not a valid status")))?;

    let order = db::orders::update_order_status(&state.pool, path.into_inner(), status)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": order,
    })))
}

#[utoipa::path(tag = "orders",
    responses((status = 200, description = "Cancelled order"), (status = 404, description = "Not found")))]
#[delete("/api/orders/{id}")]
pub async fn cancel_order(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let order = db::orders::delete_order(&state.pool, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Order cancelled successfully",
        "data": order,
    })))
}
