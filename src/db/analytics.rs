// src/db/analytics.rs
//
// Read-only aggregations for the reporting endpoints. Every query returns
// empty/zero defaults on an empty store instead of failing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use utoipa::ToSchema;

use crate::models::{Category, Order};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// The category value, or null for uncategorized products.
    #[serde(rename = "_id")]
    pub category: Option<String>,
    pub count: i64,
    pub avg_price: f64,
    pub total_stock: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryValue {
    pub total_value: f64,
    pub product_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub avg_order_value: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusStats {
    #[serde(rename = "_id")]
    pub status: String,
    pub count: i64,
    pub total_amount: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: i32,
    pub name: String,
    pub category: Option<Category>,
    pub price: f64,
    pub total_quantity: i64,
    pub total_revenue: f64,
    pub order_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MethodStats {
    #[serde(rename = "_id")]
    pub method: String,
    pub count: i64,
    pub total_amount: f64,
    pub avg_amount: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccessRate {
    pub total_payments: i64,
    pub completed_payments: i64,
    pub failed_payments: i64,
    pub pending_payments: i64,
    /// `completed / total * 100` rendered to two decimals, "0%" when empty.
    pub success_rate: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRevenue {
    #[serde(rename = "_id")]
    pub status: String,
    pub count: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    /// Calendar day, UTC, "YYYY-MM-DD".
    #[serde(rename = "_id")]
    pub day: String,
    pub daily_revenue: f64,
    pub transaction_count: i64,
}

pub async fn products_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM products")
        .fetch_one(pool)
        .await?;
    Ok(row.get("count"))
}

pub async fn products_by_category(pool: &PgPool) -> Result<Vec<CategoryStats>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT category, COUNT(*) AS count, AVG(price) AS avg_price,
                  COALESCE(SUM(stock), 0) AS total_stock
           FROM products
           GROUP BY category
           ORDER BY count DESC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| CategoryStats {
            category: r.get("category"),
            count: r.get("count"),
            avg_price: r.get("avg_price"),
            total_stock: r.get("total_stock"),
        })
        .collect())
}

pub async fn inventory_value(pool: &PgPool) -> Result<InventoryValue, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT COALESCE(SUM(price * stock), 0) AS total_value,
                  COUNT(*) AS product_count
           FROM products"#,
    )
    .fetch_one(pool)
    .await?;

    Ok(InventoryValue {
        total_value: row.get("total_value"),
        product_count: row.get("product_count"),
    })
}

pub async fn order_stats(pool: &PgPool) -> Result<OrderStats, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT COUNT(*) AS total_orders,
                  COALESCE(SUM(total_amount), 0) AS total_revenue,
                  COALESCE(AVG(total_amount), 0) AS avg_order_value
           FROM orders"#,
    )
    .fetch_one(pool)
    .await?;

    Ok(OrderStats {
        total_orders: row.get("total_orders"),
        total_revenue: row.get("total_revenue"),
        avg_order_value: row.get("avg_order_value"),
    })
}

pub async fn orders_by_status(pool: &PgPool) -> Result<Vec<OrderStatusStats>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT status, COUNT(*) AS count, SUM(total_amount) AS total_amount
           FROM orders
           GROUP BY status
           ORDER BY total_amount DESC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| OrderStatusStats {
            status: r.get("status"),
            count: r.get("count"),
            total_amount: r.get("total_amount"),
        })
        .collect())
}

/// Orders created inside the trailing window, newest-first, items resolved
/// to name/category only.
pub async fn recent_orders(pool: &PgPool, window_days: i64) -> Result<Vec<Order>, sqlx::Error> {
    let cutoff = Utc::now() - chrono::Duration::days(window_days);

    let rows = sqlx::query(
        r#"SELECT id, order_number, customer_name, customer_email,
                  total_amount, status, created_at
           FROM orders
           WHERE created_at >= $1
           ORDER BY created_at DESC"#,
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    let mut orders: Vec<Order> = rows
        .iter()
        .map(super::orders::row_to_order)
        .collect::<Result<_, _>>()?;
    super::orders::attach_items(pool, &mut orders, super::orders::ItemDetail::Brief).await?;
    Ok(orders)
}

/// Decomposes every order line into per-product totals, takes the top
/// `limit` by quantity and only then joins product details, so a line whose
/// product was deleted drops out rather than being backfilled.
pub async fn top_products(pool: &PgPool, limit: i64) -> Result<Vec<TopProduct>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT t.product_id, t.total_quantity, t.total_revenue, t.order_count,
                  p.name, p.category, p.price
           FROM (
               SELECT product_id,
                      SUM(quantity) AS total_quantity,
                      SUM(quantity * price) AS total_revenue,
                      COUNT(*) AS order_count
               FROM order_items
               GROUP BY product_id
               ORDER BY total_quantity DESC
               LIMIT $1
           ) t
           JOIN products p ON p.id = t.product_id
           ORDER BY t.total_quantity DESC"#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| TopProduct {
            product_id: r.get("product_id"),
            name: r.get("name"),
            category: r
                .get::<Option<String>, _>("category")
                .and_then(|s| Category::parse(&s)),
            price: r.get("price"),
            total_quantity: r.get("total_quantity"),
            total_revenue: r.get("total_revenue"),
            order_count: r.get("order_count"),
        })
        .collect())
}

pub async fn payments_by_method(pool: &PgPool) -> Result<Vec<MethodStats>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT payment_method, COUNT(*) AS count,
                  SUM(amount) AS total_amount, AVG(amount) AS avg_amount
           FROM payments
           GROUP BY payment_method
           ORDER BY total_amount DESC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| MethodStats {
            method: r.get("payment_method"),
            count: r.get("count"),
            total_amount: r.get("total_amount"),
            avg_amount: r.get("avg_amount"),
        })
        .collect())
}

pub async fn payment_success_rate(pool: &PgPool) -> Result<PaymentSuccessRate, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT COUNT(*) AS total,
                  COUNT(*) FILTER (WHERE status = 'Completed') AS completed,
                  COUNT(*) FILTER (WHERE status = 'Failed') AS failed,
                  COUNT(*) FILTER (WHERE status = 'Pending') AS pending
           FROM payments"#,
    )
    .fetch_one(pool)
    .await?;

    let total: i64 = row.get("total");
    let completed: i64 = row.get("completed");
    let success_rate = if total > 0 {
        format!("{:.2}%", completed as f64 / total as f64 * 100.0)
    } else {
        "0%".to_string()
    };

    Ok(PaymentSuccessRate {
        total_payments: total,
        completed_payments: completed,
        failed_payments: row.get("failed"),
        pending_payments: row.get("pending"),
        success_rate,
    })
}

pub async fn revenue_by_status(pool: &PgPool) -> Result<Vec<PaymentStatusRevenue>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT status, COUNT(*) AS count, SUM(amount) AS total_revenue
           FROM payments
           GROUP BY status
           ORDER BY total_revenue DESC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| PaymentStatusRevenue {
            status: r.get("status"),
            count: r.get("count"),
            total_revenue: r.get("total_revenue"),
        })
        .collect())
}

/// Payments created inside [start, end), grouped by UTC calendar day,
/// ascending. The caller widens the inclusive end date by one day.
pub async fn daily_revenue(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<DailyRevenue>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day,
                  SUM(amount) AS daily_revenue,
                  COUNT(*) AS transaction_count
           FROM payments
           WHERE created_at >= $1 AND created_at < $2
           GROUP BY day
           ORDER BY day ASC"#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| DailyRevenue {
            day: r.get("day"),
            daily_revenue: r.get("daily_revenue"),
            transaction_count: r.get("transaction_count"),
        })
        .collect())
}
