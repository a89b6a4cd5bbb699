// src/api/analytics.rs
//
// Admin-only reporting endpoints. Thin wrappers over db::analytics; every
// handler answers 200 with zero-valued data on an empty store.

use actix_web::{get, web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::api::auth::{require_admin, AuthUser};
use crate::error::ApiError;
use crate::{db, AppState};

const RECENT_ORDERS_WINDOW_DAYS: i64 = 30;
const TOP_PRODUCTS_LIMIT: i64 = 5;

#[utoipa::path(tag = "analytics", responses((status = 200, description = "Total product count")))]
#[get("/api/analytics/products/count")]
pub async fn products_count(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let count = db::analytics::products_count(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": count,
    })))
}

#[utoipa::path(tag = "analytics",
    responses((status = 200, description = "Count, average price and stock per category")))]
#[get("/api/analytics/products/by-category")]
pub async fn products_by_category(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let stats = db::analytics::products_by_category(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": stats.len(),
        "data": stats,
    })))
}

#[utoipa::path(tag = "analytics", responses((status = 200, description = "Total inventory value")))]
#[get("/api/analytics/products/value")]
pub async fn inventory_value(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let value = db::analytics::inventory_value(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": value,
    })))
}

#[utoipa::path(tag = "analytics", responses((status = 200, description = "Order totals and average")))]
#[get("/api/analytics/orders/stats")]
pub async fn order_stats(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let stats = db::analytics::order_stats(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": stats,
    })))
}

#[utoipa::path(tag = "analytics",
    responses((status = 200, description = "Order count and amount per status")))]
#[get("/api/analytics/orders/by-status")]
pub async fn orders_by_status(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let stats = db::analytics::orders_by_status(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": stats.len(),
        "data": stats,
    })))
}

#[utoipa::path(tag = "analytics",
    responses((status = 200, description = "Orders from the trailing 30 days")))]
#[get("/api/analytics/orders/recent")]
pub async fn recent_orders(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let orders = db::analytics::recent_orders(&state.pool, RECENT_ORDERS_WINDOW_DAYS).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": orders.len(),
        "data": orders,
    })))
}

#[utoipa::path(tag = "analytics",
    responses((status = 200, description = "Top 5 products by quantity ordered")))]
#[get("/api/analytics/orders/top-products")]
pub async fn top_products(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let products = db::analytics::top_products(&state.pool, TOP_PRODUCTS_LIMIT).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": products.len(),
        "data": products,
    })))
}

#[utoipa::path(tag = "analytics",
    responses((status = 200, description = "Amounts collected per payment method")))]
#[get("/api/analytics/payments/by-method")]
pub async fn payments_by_method(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let stats = db::analytics::payments_by_method(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": stats.len(),
        "data": stats,
    })))
}

#[utoipa::path(tag = "analytics", responses((status = 200, description = "Payment success rate")))]
#[get("/api/analytics/payments/success-rate")]
pub async fn payment_success_rate(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let stats = db::analytics::payment_success_rate(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": stats,
    })))
}

#[utoipa::path(tag = "analytics",
    responses((status = 200, description = "Revenue per payment status")))]
#[get("/api/analytics/payments/revenue")]
pub async fn revenue_by_status(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let stats = db::analytics::revenue_by_status(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": stats.len(),
        "data": stats,
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenueQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[utoipa::path(tag = "analytics", params(DailyRevenueQuery),
    responses((status = 200, description = "Revenue per calendar day"), (status = 400, description = "Missing or invalid date bounds")))]
#[get("/api/analytics/payments/daily")]
pub async fn daily_revenue(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<DailyRevenueQuery>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let (Some(start_raw), Some(end_raw)) = (query.start_date.as_deref(), query.end_date.as_deref())
    else {
        return Err(ApiError::validation(
            "startDate and endDate query parameters are required",
        ));
    };

    let start = parse_date(start_raw)?;
    let end = parse_date(end_raw)?;
    // inclusive end date: widen to the start of the following day
    let end_exclusive = end
        .succ_opt()
        .ok_or_else(|| ApiError::validation("endDate out of range"))?;

    let buckets = db::analytics::daily_revenue(
        &state.pool,
        start.and_time(NaiveTime::MIN).and_utc(),
        end_exclusive.and_time(NaiveTime::MIN).and_utc(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": buckets.len(),
        "dateRange": { "startDate": start_raw, "endDate": end_raw },
        "data": buckets,
    })))
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("{raw} is not a valid ISO date")))
}
