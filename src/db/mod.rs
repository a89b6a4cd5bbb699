// src/db/mod.rs

pub mod analytics;
pub mod orders;
pub mod payments;
pub mod products;

/// Postgres unique_violation (duplicate email, duplicate order payment,
/// order_number or transaction_id collision).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

/// CHECK constraints keep enum columns in range, so a parse failure on read
/// means the schema and the code disagree.
pub(crate) fn decode_err(column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unexpected {column} value: {value}").into(),
    }
}
