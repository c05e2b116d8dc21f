//! Connection pooling

mod postgres;

pub use postgres::{create_pool, ping, DatabaseConfig};
pub use sqlx::postgres::PgPool;
