// src/api/products.rs

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::api::auth::{require_admin, AuthUser};
use crate::error::ApiError;
use crate::models::{CreateProductRequest, UpdateProductRequest};
use crate::{db, AppState};

const MAX_PAGE: i64 = 1_000_000;
const MAX_LIMIT: i64 = 1_000;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LowStockQuery {
    pub threshold: Option<i32>,
}

/// Whitelist so the sort field can be interpolated into SQL. Unknown
/// fields fall back to the default ordering.
fn sort_column(field: &str) -> Option<&'static str> {
    match field {
        "name" => Some("name"),
        "price" => Some("price"),
        "stock" => Some("stock"),
        "category" => Some("category"),
        "createdAt" | "created_at" => Some("created_at"),
        _ => None,
    }
}

fn validate_product_fields(
    name: Option<&str>,
    price: Option<f64>,
    stock: Option<i32>,
) -> Result<(), ApiError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("Product name is required"));
        }
    }
    if let Some(price) = price {
        if price < 0.0 {
            return Err(ApiError::validation("Price cannot be negative"));
        }
    }
    if let Some(stock) = stock {
        if stock < 0 {
            return Err(ApiError::validation("Stock cannot be negative"));
        }
    }
    Ok(())
}

#[utoipa::path(tag = "products", request_body = CreateProductRequest,
    responses((status = 201, description = "Product created")))]
#[post("/api/products")]
pub async fn create_product(
    state: web::Data<AppState>,
    user: AuthUser,
    payload: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    validate_product_fields(Some(&payload.name), Some(payload.price), payload.stock)?;

    let product = db::products::create_product(&state.pool, &payload).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": product,
    })))
}

#[utoipa::path(tag = "products", params(ProductListQuery),
    responses((status = 200, description = "Filtered, sorted, paginated products")))]
#[get("/api/products")]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ProductListQuery>,
) -> Result<HttpResponse, ApiError> {
    // clamped so page * limit stays far from i64 overflow
    let page = query.page.unwrap_or(1).clamp(1, MAX_PAGE);
    let limit = query.limit.unwrap_or(10).clamp(1, MAX_LIMIT);
    let sort = query.sort.as_deref().and_then(sort_column);
    let descending = query.order.as_deref() == Some("desc");

    let (products, total) = db::products::list_products(
        &state.pool,
        query.category.as_deref(),
        query.min_price,
        query.max_price,
        sort,
        descending,
        page,
        limit,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": products.len(),
        "total": total,
        "page": page,
        "pages": (total + limit - 1) / limit,
        "data": products,
    })))
}

#[utoipa::path(tag = "products", params(SearchQuery),
    responses((status = 200, description = "Products matching the query")))]
#[get("/api/products/search")]
pub async fn search_products(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) else {
        return Err(ApiError::validation(
            "Search query parameter \"q\" is required",
        ));
    };

    let products = db::products::search_products(&state.pool, q).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": products.len(),
        "query": q,
        "data": products,
    })))
}

#[utoipa::path(tag = "products", params(LowStockQuery),
    responses((status = 200, description = "Products below the stock threshold")))]
#[get("/api/products/low-stock")]
pub async fn low_stock_products(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<LowStockQuery>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    let threshold = query.threshold.unwrap_or(10);

    let products = db::products::low_stock_products(&state.pool, threshold).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": products.len(),
        "threshold": threshold,
        "data": products,
    })))
}

#[utoipa::path(tag = "products",
    responses((status = 200, description = "The product"), (status = 404, description = "Not found")))]
#[get("/api/products/{id}")]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let product = db::products::get_product(&state.pool, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": product,
    })))
}

#[utoipa::path(tag = "products", request_body = UpdateProductRequest,
    responses((status = 200, description = "Updated product"), (status = 404, description = "Not found")))]
#[put("/api/products/{id}")]
pub async fn update_product(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
    payload: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;
    validate_product_fields(payload.name.as_deref(), payload.price, payload.stock)?;

    let product = db::products::update_product(&state.pool, path.into_inner(), &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": product,
    })))
}

#[utoipa::path(tag = "products",
    responses((status = 200, description = "Deleted product"), (status = 404, description = "Not found")))]
#[delete("/api/products/{id}")]
pub async fn delete_product(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let product = db::products::delete_product(&state.pool, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Product deleted successfully",
        "data": product,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_whitelist() {
        assert_eq!(sort_column("price"), Some("price"));
        assert_eq!(sort_column("createdAt"), Some("created_at"));
        assert_eq!(sort_column("id; DROP TABLE products"), None);
        assert_eq!(sort_column(""), None);
    }

    #[test]
    fn product_field_validation() {
        assert!(validate_product_fields(Some("Widget"), Some(9.99), Some(3)).is_ok());
        assert!(validate_product_fields(Some("  "), None, None).is_err());
        assert!(validate_product_fields(None, Some(-0.01), None).is_err());
        assert!(validate_product_fields(None, None, Some(-1)).is_err());
        assert!(validate_product_fields(None, None, None).is_ok());
    }
}
