// src/db/products.rs

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::db::decode_err;
use crate::models::{Category, CreateProductRequest, Product, UpdateProductRequest};

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, stock, created_at";

fn row_to_product(r: &PgRow) -> Result<Product, sqlx::Error> {
    let category = match r.get::<Option<String>, _>("category") {
        Some(s) => Some(Category::parse(&s).ok_or_else(|| decode_err("category", &s))?),
        None => None,
    };
    Ok(Product {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        price: r.get("price"),
        category,
        stock: r.get("stock"),
        created_at: r.get("created_at"),
    })
}

fn collect(rows: Vec<PgRow>) -> Result<Vec<Product>, sqlx::Error> {
    rows.iter().map(row_to_product).collect()
}

pub async fn create_product(
    pool: &PgPool,
    input: &CreateProductRequest,
) -> Result<Product, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"INSERT INTO products (name, description, price, category, stock)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING {PRODUCT_COLUMNS}"#
    ))
    .bind(input.name.trim())
    .bind(input.description.as_deref())
    .bind(input.price)
    .bind(input.category.map(|c| c.as_str()))
    .bind(input.stock.unwrap_or(0))
    .fetch_one(pool)
    .await?;

    row_to_product(&row)
}

fn push_filters<'a>(
    qb: &mut QueryBuilder<'a, Postgres>,
    category: Option<&'a str>,
    min_price: Option<f64>,
    max_price: Option<f64>,
) {
    if let Some(category) = category {
        qb.push(" AND category = ").push_bind(category);
    }
    if let Some(min) = min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
}

/// Filter/sort/paginate listing. `sort` must already be a whitelisted column
/// name; it is interpolated into the statement, not bound.
#[allow(clippy::too_many_arguments)]
pub async fn list_products(
    pool: &PgPool,
    category: Option<&str>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sort: Option<&str>,
    descending: bool,
    page: i64,
    limit: i64,
) -> Result<(Vec<Product>, i64), sqlx::Error> {
    let mut count_qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) AS total FROM products WHERE TRUE");
    push_filters(&mut count_qb, category, min_price, max_price);
    let total: i64 = count_qb.build().fetch_one(pool).await?.get("total");

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));
    push_filters(&mut qb, category, min_price, max_price);
    if let Some(column) = sort {
        qb.push(format!(
            " ORDER BY {column} {}",
            if descending { "DESC" } else { "ASC" }
        ));
    }
    qb.push(" OFFSET ").push_bind((page - 1).saturating_mul(limit));
    qb.push(" LIMIT ").push_bind(limit);

    let rows = qb.build().fetch_all(pool).await?;
    Ok((collect(rows)?, total))
}

pub async fn get_product(pool: &PgPool, id: i32) -> Result<Option<Product>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_product).transpose()
}

pub async fn update_product(
    pool: &PgPool,
    id: i32,
    input: &UpdateProductRequest,
) -> Result<Option<Product>, sqlx::Error> {
    if input.name.is_none()
        && input.description.is_none()
        && input.price.is_none()
        && input.category.is_none()
        && input.stock.is_none()
    {
        // nothing to change, mirror a no-op update
        return get_product(pool, id).await;
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");
    let mut set = qb.separated(", ");
    if let Some(name) = &input.name {
        set.push("name = ").push_bind_unseparated(name.trim());
    }
    if let Some(description) = &input.description {
        set.push("description = ").push_bind_unseparated(description);
    }
    if let Some(price) = input.price {
        set.push("price = ").push_bind_unseparated(price);
    }
    if let Some(category) = input.category {
        set.push("category = ").push_bind_unseparated(category.as_str());
    }
    if let Some(stock) = input.stock {
        set.push("stock = ").push_bind_unseparated(stock);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(format!(" RETURNING {PRODUCT_COLUMNS}"));

    let row = qb.build().fetch_optional(pool).await?;
    row.as_ref().map(row_to_product).transpose()
}

pub async fn delete_product(pool: &PgPool, id: i32) -> Result<Option<Product>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_product).transpose()
}

/// Case-insensitive substring match over name OR description.
pub async fn search_products(pool: &PgPool, query: &str) -> Result<Vec<Product>, sqlx::Error> {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = format!("%{escaped}%");

    let rows = sqlx::query(&format!(
        r#"SELECT {PRODUCT_COLUMNS} FROM products
           WHERE name ILIKE $1 OR description ILIKE $1"#
    ))
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    collect(rows)
}

/// Stock strictly below the threshold, lowest stock first.
pub async fn low_stock_products(
    pool: &PgPool,
    threshold: i32,
) -> Result<Vec<Product>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock < $1 ORDER BY stock ASC"
    ))
    .bind(threshold)
    .fetch_all(pool)
    .await?;

    collect(rows)
}
