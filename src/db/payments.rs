// src/db/payments.rs

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::db::decode_err;
use crate::models::{
    CreatePaymentRequest, OrderStatus, OrderSummary, Payment, PaymentMethod, PaymentStatus,
};

/// How much of the referenced order a payment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDetail {
    /// order_id only (freshly created payments).
    None,
    /// order_number, customer_name, total_amount, status (listing).
    Summary,
    /// Summary minus status (by-status listing).
    Brief,
    /// every order field (single payment fetch, processing).
    Full,
}

const PAYMENT_COLUMNS: &str = "pay.id, pay.order_id, pay.customer_name, pay.customer_email, \
     pay.amount, pay.payment_method, pay.status, pay.transaction_id, \
     pay.processed_at, pay.created_at, pay.updated_at";

const ORDER_JOIN_COLUMNS: &str = "o.id AS joined_order_id, o.order_number, \
     o.customer_name AS order_customer_name, o.customer_email AS order_customer_email, \
     o.total_amount, o.status AS order_status, o.created_at AS order_created_at";

fn row_to_payment(r: &PgRow, detail: OrderDetail) -> Result<Payment, sqlx::Error> {
    let method: String = r.get("payment_method");
    let payment_method = match method.as_str() {
        "CreditCard" => PaymentMethod::CreditCard,
        "DebitCard" => PaymentMethod::DebitCard,
        "PayPal" => PaymentMethod::PayPal,
        "Cash" => PaymentMethod::Cash,
        other => return Err(decode_err("payment_method", other)),
    };
    let status: String = r.get("status");
    let status = PaymentStatus::parse(&status).ok_or_else(|| decode_err("status", &status))?;

    let order = match detail {
        OrderDetail::None => None,
        detail => match r.get::<Option<i32>, _>("joined_order_id") {
            // the referenced order may have been deleted; the payment stands
            None => None,
            Some(order_id) => {
                let order_status: String = r.get("order_status");
                let order_status = OrderStatus::parse(&order_status)
                    .ok_or_else(|| decode_err("order_status", &order_status))?;
                Some(OrderSummary {
                    id: order_id,
                    order_number: r.get("order_number"),
                    customer_name: r.get("order_customer_name"),
                    total_amount: r.get("total_amount"),
                    status: match detail {
                        OrderDetail::Brief => None,
                        _ => Some(order_status),
                    },
                    customer_email: match detail {
                        OrderDetail::Full => r.get("order_customer_email"),
                        _ => None,
                    },
                    created_at: match detail {
                        OrderDetail::Full => Some(r.get("order_created_at")),
                        _ => None,
                    },
                })
            }
        },
    };

    Ok(Payment {
        id: r.get("id"),
        order_id: r.get("order_id"),
        customer_name: r.get("customer_name"),
        customer_email: r.get("customer_email"),
        amount: r.get("amount"),
        payment_method,
        status,
        transaction_id: r.get("transaction_id"),
        processed_at: r.get("processed_at"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        order,
    })
}

/// A second payment for the same order violates the unique index; the
/// caller turns that into a validation error.
pub async fn create_payment(
    pool: &PgPool,
    input: &CreatePaymentRequest,
    customer_email: &str,
) -> Result<Payment, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"INSERT INTO payments
               (order_id, customer_name, customer_email, amount, payment_method, status, transaction_id)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING {}"#,
        PAYMENT_COLUMNS.replace("pay.", "")
    ))
    .bind(input.order_id)
    .bind(input.customer_name.trim())
    .bind(customer_email)
    .bind(input.amount)
    .bind(input.payment_method.as_str())
    .bind(input.status.unwrap_or(PaymentStatus::Pending).as_str())
    .bind(input.transaction_id.as_deref())
    .fetch_one(pool)
    .await?;

    row_to_payment(&row, OrderDetail::None)
}

async fn fetch_joined(
    pool: &PgPool,
    where_clause: &str,
    bind_text: Option<&str>,
    bind_id: Option<i32>,
    detail: OrderDetail,
) -> Result<Vec<Payment>, sqlx::Error> {
    let sql = format!(
        r#"SELECT {PAYMENT_COLUMNS}, {ORDER_JOIN_COLUMNS}
           FROM payments pay
           LEFT JOIN orders o ON o.id = pay.order_id
           {where_clause}
           ORDER BY pay.created_at DESC"#
    );
    let mut query = sqlx::query(&sql);
    if let Some(text) = bind_text {
        query = query.bind(text);
    }
    if let Some(id) = bind_id {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;
    rows.iter().map(|r| row_to_payment(r, detail)).collect()
}

pub async fn list_payments(pool: &PgPool) -> Result<Vec<Payment>, sqlx::Error> {
    fetch_joined(pool, "", None, None, OrderDetail::Summary).await
}

pub async fn get_payment(pool: &PgPool, id: i32) -> Result<Option<Payment>, sqlx::Error> {
    let mut payments = fetch_joined(
        pool,
        "WHERE pay.id = $1",
        None,
        Some(id),
        OrderDetail::Full,
    )
    .await?;
    Ok(payments.pop())
}

pub async fn payment_by_order(
    pool: &PgPool,
    order_id: i32,
) -> Result<Option<Payment>, sqlx::Error> {
    let mut payments = fetch_joined(
        pool,
        "WHERE pay.order_id = $1",
        None,
        Some(order_id),
        OrderDetail::Full,
    )
    .await?;
    Ok(payments.pop())
}

pub async fn payments_by_status(
    pool: &PgPool,
    status: PaymentStatus,
) -> Result<Vec<Payment>, sqlx::Error> {
    fetch_joined(
        pool,
        "WHERE pay.status = $1",
        Some(status.as_str()),
        None,
        OrderDetail::Brief,
    )
    .await
}

/// Marks the payment Completed, stores the transaction id and stamps
/// processed_at. Not idempotent: a second call re-stamps both fields.
pub async fn process_payment(
    pool: &PgPool,
    id: i32,
    transaction_id: &str,
) -> Result<Option<Payment>, sqlx::Error> {
    let updated = sqlx::query(
        r#"UPDATE payments
           SET status = 'Completed', transaction_id = $2,
               processed_at = NOW(), updated_at = NOW()
           WHERE id = $1"#,
    )
    .bind(id)
    .bind(transaction_id)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Ok(None);
    }
    get_payment(pool, id).await
}
