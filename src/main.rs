// src/main.rs
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Responder};
use dotenvy::dotenv;
use serde_json::json;
use sqlx::PgPool;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ecommerce_api::error::ApiError;
use ecommerce_api::{api, docs, AppState};

async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the E-Commerce API",
        "endpoints": {
            "auth": "/api/auth",
            "products": "/api/products",
            "orders": "/api/orders",
            "payments": "/api/payments",
            "analytics": "/api/analytics"
        }
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET required");
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let state = web::Data::new(AppState { pool, jwt_secret });

    log::info!("listening on 0.0.0.0:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            // malformed bodies and query strings answer in the same
            // {success, message} envelope as everything else
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ApiError::Validation(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                ApiError::Validation(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                ApiError::Validation(err.to_string()).into()
            }))
            .wrap(middleware::Logger::default())
            .route("/", web::get().to(index))
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            .service(api::auth::register)
            .service(api::auth::login)
            // specific routes before parameterized ones
            .service(api::products::search_products)
            .service(api::products::low_stock_products)
            .service(api::products::create_product)
            .service(api::products::list_products)
            .service(api::products::get_product)
            .service(api::products::update_product)
            .service(api::products::delete_product)
            .service(api::orders::orders_by_customer)
            .service(api::orders::update_order_status)
            .service(api::orders::create_order)
            .service(api::orders::list_orders)
            .service(api::orders::get_order)
            .service(api::orders::cancel_order)
            .service(api::payments::payment_by_order)
            .service(api::payments::payments_by_status)
            .service(api::payments::process_payment)
            .service(api::payments::create_payment)
            .service(api::payments::list_payments)
            .service(api::payments::get_payment)
            .service(api::analytics::products_count)
            .service(api::analytics::products_by_category)
            .service(api::analytics::inventory_value)
            .service(api::analytics::order_stats)
            .service(api::analytics::orders_by_status)
            .service(api::analytics::recent_orders)
            .service(api::analytics::top_products)
            .service(api::analytics::payments_by_method)
            .service(api::analytics::payment_success_rate)
            .service(api::analytics::revenue_by_status)
            .service(api::analytics::daily_revenue)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
