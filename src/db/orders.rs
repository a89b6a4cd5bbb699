// src/db/orders.rs

use std::collections::HashMap;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::db::decode_err;
use crate::models::{
    Category, CreateOrderRequest, Order, OrderItem, OrderStatus, ProductSummary,
};

/// How much of the referenced product an order item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemDetail {
    /// product_id only, no join (freshly created / status-updated orders).
    Raw,
    /// name, price, category (order listings).
    Summary,
    /// name, category (recent-orders report).
    Brief,
    /// every product field (single order fetch).
    Full,
}

const ORDER_COLUMNS: &str =
    "id, order_number, customer_name, customer_email, total_amount, status, created_at";

pub(crate) fn row_to_order(r: &PgRow) -> Result<Order, sqlx::Error> {
    let status: String = r.get("status");
    let status = OrderStatus::parse(&status).ok_or_else(|| decode_err("status", &status))?;
    Ok(Order {
        id: r.get("id"),
        order_number: r.get("order_number"),
        customer_name: r.get("customer_name"),
        customer_email: r.get("customer_email"),
        items: Vec::new(),
        total_amount: r.get("total_amount"),
        status,
        created_at: r.get("created_at"),
    })
}

/// Left-joins order_items to products and fills `order.items` for every
/// order in the slice. A deleted product leaves `item.product` as None,
/// the line itself survives.
pub(crate) async fn attach_items(
    pool: &PgPool,
    orders: &mut [Order],
    detail: ItemDetail,
) -> Result<(), sqlx::Error> {
    if orders.is_empty() {
        return Ok(());
    }
    let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();

    let rows = sqlx::query(
        r#"SELECT oi.order_id, oi.product_id, oi.quantity, oi.price,
                  p.id AS joined_id, p.name, p.description,
                  p.price AS product_price, p.category, p.stock
           FROM order_items oi
           LEFT JOIN products p ON p.id = oi.product_id
           WHERE oi.order_id = ANY($1)
           ORDER BY oi.id"#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
    for r in &rows {
        let product = match (detail, r.get::<Option<i32>, _>("joined_id")) {
            (ItemDetail::Raw, _) | (_, None) => None,
            (detail, Some(_)) => {
                let category = r
                    .get::<Option<String>, _>("category")
                    .and_then(|s| Category::parse(&s));
                Some(match detail {
                    ItemDetail::Summary => ProductSummary {
                        name: r.get("name"),
                        price: Some(r.get("product_price")),
                        category,
                        description: None,
                        stock: None,
                    },
                    ItemDetail::Brief => ProductSummary {
                        name: r.get("name"),
                        price: None,
                        category,
                        description: None,
                        stock: None,
                    },
                    _ => ProductSummary {
                        name: r.get("name"),
                        price: Some(r.get("product_price")),
                        category,
                        description: r.get("description"),
                        stock: Some(r.get("stock")),
                    },
                })
            }
        };
        by_order.entry(r.get("order_id")).or_default().push(OrderItem {
            product_id: r.get("product_id"),
            quantity: r.get("quantity"),
            price: r.get("price"),
            product,
        });
    }

    for order in orders {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(())
}

/// Inserts the order and its items in one transaction. `order_number` must
/// already be generated; it is never regenerated after this point.
pub async fn create_order(
    pool: &PgPool,
    input: &CreateOrderRequest,
    order_number: &str,
    customer_email: &str,
) -> Result<Order, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query(&format!(
        r#"INSERT INTO orders (order_number, customer_name, customer_email, total_amount, status)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING {ORDER_COLUMNS}"#
    ))
    .bind(order_number)
    .bind(input.customer_name.trim())
    .bind(customer_email)
    .bind(input.total_amount)
    .bind(input.status.unwrap_or(OrderStatus::Pending).as_str())
    .fetch_one(&mut *tx)
    .await?;

    let mut order = row_to_order(&row)?;

    for item in &input.items {
        sqlx::query(
            r#"INSERT INTO order_items (order_id, product_id, quantity, price)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(order.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    order.items = input
        .items
        .iter()
        .map(|i| OrderItem {
            product_id: i.product_id,
            quantity: i.quantity,
            price: i.price,
            product: None,
        })
        .collect();
    Ok(order)
}

pub async fn list_orders(pool: &PgPool) -> Result<Vec<Order>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    let mut orders: Vec<Order> = rows.iter().map(row_to_order).collect::<Result<_, _>>()?;
    attach_items(pool, &mut orders, ItemDetail::Summary).await?;
    Ok(orders)
}

pub async fn get_order(pool: &PgPool, id: i32) -> Result<Option<Order>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut orders = vec![row_to_order(&row)?];
    attach_items(pool, &mut orders, ItemDetail::Full).await?;
    Ok(orders.pop())
}

pub async fn orders_by_customer_email(
    pool: &PgPool,
    email: &str,
) -> Result<Vec<Order>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_email = $1 ORDER BY created_at DESC"
    ))
    .bind(email)
    .fetch_all(pool)
    .await?;

    let mut orders: Vec<Order> = rows.iter().map(row_to_order).collect::<Result<_, _>>()?;
    attach_items(pool, &mut orders, ItemDetail::Full).await?;
    Ok(orders)
}

/// Replaces the status unconditionally; any status may follow any other.
pub async fn update_order_status(
    pool: &PgPool,
    id: i32,
    status: OrderStatus,
) -> Result<Option<Order>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut orders = vec![row_to_order(&row)?];
    attach_items(pool, &mut orders, ItemDetail::Raw).await?;
    Ok(orders.pop())
}

/// Deletes the order (items cascade) and returns it for confirmation.
pub async fn delete_order(pool: &PgPool, id: i32) -> Result<Option<Order>, sqlx::Error> {
    let Some(mut order) = get_order(pool, id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    // hand back the record as it was, without the join projections
    for item in &mut order.items {
        item.product = None;
    }
    Ok(Some(order))
}
