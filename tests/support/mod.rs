// Not every test binary touches every helper.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use std::env;
use std::sync::OnceLock;
use tokio::sync::{Mutex, MutexGuard};

use ecommerce_api::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Splits a database url into (everything up to and including the final '/',
/// database name, query-string suffix).
fn split_db_url(url: &str) -> Result<(String, String, String), String> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base.to_string(), format!("?{query}")),
        None => (url.to_string(), String::new()),
    };

    let db_start = base
        .rfind('/')
        .ok_or_else(|| "invalid database url".to_string())?;
    if db_start + 1 >= base.len() {
        return Err("database name is empty".to_string());
    }

    let prefix = base[..db_start + 1].to_string();
    let db_name = base[db_start + 1..].to_string();
    Ok((prefix, db_name, query))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestDb {
    pub pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

/// Drops and recreates a dedicated test database, then runs migrations.
/// `suffix` keeps concurrently running test binaries out of each other's
/// databases; tests within one binary serialize on the mutex.
pub async fn init_test_db(suffix: &str) -> TestDb {
    dotenvy::dotenv().ok();
    let base_url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let (prefix, base_name, query) =
        split_db_url(&base_url).expect("invalid TEST_DATABASE_URL format");

    let db_name = format!("{base_name}_{suffix}");
    let admin_url = format!("{prefix}postgres{query}");
    let test_url = format!("{prefix}{db_name}{query}");

    let lock = TEST_DB_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().await;

    let admin_pool = PgPool::connect(&admin_url).await.expect("connect admin db");

    let _ = sqlx::query("SELECT pg_advisory_lock(424242)")
        .execute(&admin_pool)
        .await;

    let quoted_name = quote_identifier(&db_name);
    let drop_sql = format!("DROP DATABASE IF EXISTS {quoted_name} WITH (FORCE)");
    let create_sql = format!("CREATE DATABASE {quoted_name}");

    let _ = sqlx::query(&drop_sql).execute(&admin_pool).await;
    sqlx::query(&create_sql)
        .execute(&admin_pool)
        .await
        .expect("create test db");

    let _ = sqlx::query("SELECT pg_advisory_unlock(424242)")
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;

    let pool = PgPool::connect(&test_url).await.expect("connect test db");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    TestDb {
        pool,
        _guard: guard,
    }
}

pub fn build_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        jwt_secret: TEST_JWT_SECRET.to_string(),
    }
}

#[derive(Serialize)]
struct Claims {
    sub: i32,
    role: String,
    exp: usize,
}

/// Mints a token the extractor accepts; the user does not need a row in
/// the users table since authorization is claims-based.
pub fn token_for(user_id: i32, role: &str) -> String {
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: (Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encode test token")
}

pub async fn insert_product(
    pool: &PgPool,
    name: &str,
    price: f64,
    category: Option<&str>,
    stock: i32,
) -> i32 {
    sqlx::query(
        r#"INSERT INTO products (name, price, category, stock)
           VALUES ($1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(name)
    .bind(price)
    .bind(category)
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("insert product")
    .get("id")
}

pub async fn insert_order(
    pool: &PgPool,
    order_number: &str,
    customer_email: &str,
    total_amount: f64,
    status: &str,
) -> i32 {
    sqlx::query(
        r#"INSERT INTO orders (order_number, customer_name, customer_email, total_amount, status)
           VALUES ($1, 'Test Customer', $2, $3, $4)
           RETURNING id"#,
    )
    .bind(order_number)
    .bind(customer_email)
    .bind(total_amount)
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("insert order")
    .get("id")
}

pub async fn insert_order_item(
    pool: &PgPool,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price: f64,
) {
    sqlx::query(
        r#"INSERT INTO order_items (order_id, product_id, quantity, price)
           VALUES ($1, $2, $3, $4)"#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price)
    .execute(pool)
    .await
    .expect("insert order item");
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_payment(
    pool: &PgPool,
    order_id: i32,
    customer_email: &str,
    amount: f64,
    method: &str,
    status: &str,
    created_at: Option<DateTime<Utc>>,
) -> i32 {
    sqlx::query(
        r#"INSERT INTO payments
               (order_id, customer_name, customer_email, amount, payment_method, status, created_at)
           VALUES ($1, 'Test Customer', $2, $3, $4, $5, COALESCE($6, NOW()))
           RETURNING id"#,
    )
    .bind(order_id)
    .bind(customer_email)
    .bind(amount)
    .bind(method)
    .bind(status)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .expect("insert payment")
    .get("id")
}
