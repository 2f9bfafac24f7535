//! # Coffee Shop DB
//!
//! Database pool and utilities for the Coffee Shop API.
//!
//! This crate provides connection pool initialization, the embedded schema
//! migrations, and the reset used by the administration CLI.
//!
//! # Example
//!
//! ```ignore
//! use coffeeshop_config::DatabaseConfig;
//! use coffeeshop_db::{init_db_pool, run_migrations};
//!
//! let config = DatabaseConfig::from_env().expect("DATABASE_URL must be set");
//! let pool = init_db_pool(&config).await?;
//! run_migrations(&pool).await?;
//! ```

use coffeeshop_config::DatabaseConfig;
use coffeeshop_models::drinks::Ingredient;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;

pub use sqlx::PgPool;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("failed to encode seed recipe: {0}")]
    Seed(#[from] serde_json::Error),
}

/// Initializes a PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable; call this once at startup and share it
/// through the application state.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies the migrations under `migrations/`. Already-applied ones are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// The drink every fresh database starts with.
pub fn seed_drink() -> (String, Vec<Ingredient>) {
    ("water".to_string(), vec![Ingredient::new("water", "blue", 1)])
}

/// Empties the drinks table, restarts its id sequence and inserts the seed drink.
///
/// Runs in a single transaction; on failure the table is left untouched.
pub async fn reset_drinks(pool: &PgPool) -> Result<i32, DbError> {
    run_migrations(pool).await?;

    let (title, recipe) = seed_drink();
    let recipe = serde_json::to_string(&recipe)?;

    let mut tx = pool.begin().await?;

    sqlx::query("TRUNCATE TABLE drinks RESTART IDENTITY")
        .execute(&mut *tx)
        .await?;

    let id: i32 = sqlx::query_scalar("INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id")
        .bind(&title)
        .bind(&recipe)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(id, title = %title, "Drinks table reset");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_drink_is_water() {
        let (title, recipe) = seed_drink();
        assert_eq!(title, "water");
        assert_eq!(
            serde_json::to_string(&recipe).unwrap(),
            r#"[{"name":"water","color":"blue","parts":1}]"#
        );
    }
}
