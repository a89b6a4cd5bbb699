pub mod api;
pub mod db;
pub mod docs;
pub mod error;
pub mod models;

use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_secret: String,
}
