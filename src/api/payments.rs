// src/api/payments.rs

use actix_web::{get, patch, post, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::api::auth::{require_admin, AuthUser};
use crate::error::ApiError;
use crate::models::{
    is_valid_email, CreatePaymentRequest, PaymentStatus, ProcessPaymentRequest,
};
use crate::{db, AppState};

#[utoipa::path(tag = "payments", request_body = CreatePaymentRequest,
    responses((status = 201, description = "Payment created"), (status = 400, description = "Validation failure or duplicate payment for order")))]
#[post("/api/payments")]
pub async fn create_payment(
    state: web::Data<AppState>,
    payload: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    if payload.customer_name.trim().is_empty() {
        return Err(ApiError::validation("Customer name is required"));
    }
    let customer_email = payload.customer_email.trim().to_lowercase();
    if !is_valid_email(&customer_email) {
        return Err(ApiError::validation("Please provide a valid email"));
    }
    if payload.amount < 0.0 {
        return Err(ApiError::validation("Amount cannot be negative"));
    }

    let payment = db::payments::create_payment(&state.pool, &payload, &customer_email)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ApiError::validation("A payment already exists for this order")
            } else {
                ApiError::Store(e)
            }
        })?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": payment,
    })))
}

#[utoipa::path(tag = "payments",
    responses((status = 200, description = "All payments, newest first")))]
#[get("/api/payments")]
pub async fn list_payments(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let payments = db::payments::list_payments(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": payments.len(),
        "data": payments,
    })))
}

#[utoipa::path(tag = "payments",
    responses((status = 200, description = "Payment for the order"), (status = 404, description = "Not found")))]
#[get("/api/payments/order/{orderId}")]
pub async fn payment_by_order(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let payment = db::payments::payment_by_order(&state.pool, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Payment not found for this order"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": payment,
    })))
}

#[utoipa::path(tag = "payments",
    responses((status = 200, description = "Payments with the given status"), (status = 400, description = "Invalid status")))]
#[get("/api/payments/status/{status}")]
pub async fn payments_by_status(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let raw = path.into_inner();
    let status = PaymentStatus::parse(&raw)
        .ok_or_else(|| ApiError::validation(format!("{raw} is not a valid status")))?;

    // no match is an empty list, not an error
    let payments = db::payments::payments_by_status(&state.pool, status).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": payments.len(),
        "status": status,
        "data": payments,
    })))
}

#[utoipa::path(tag = "payments", request_body = ProcessPaymentRequest,
    responses((status = 200, description = "Payment processed"), (status = 404, description = "Not found")))]
#[patch("/api/payments/{id}/process")]
pub async fn process_payment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
    payload: Option<web::Json<ProcessPaymentRequest>>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    // not idempotent; a second call re-stamps the transaction id
    let transaction_id = payload
        .and_then(|p| p.transaction_id.clone())
        .unwrap_or_else(|| format!("TXN-{}", Utc::now().timestamp_millis()));

    let payment = db::payments::process_payment(&state.pool, path.into_inner(), &transaction_id)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ApiError::validation("Transaction id already in use")
            } else {
                ApiError::Store(e)
            }
        })?
        .ok_or_else(|| ApiError::not_found("Payment not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Payment processed successfully",
        "data": payment,
    })))
}

#[utoipa::path(tag = "payments",
    responses((status = 200, description = "The payment"), (status = 404, description = "Not found")))]
#[get("/api/payments/{id}")]
pub async fn get_payment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let payment = db::payments::get_payment(&state.pool, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Payment not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": payment,
    })))
}
