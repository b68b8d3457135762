use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

use crate::config::Config;
use crate::db::models::drink::{Ingredient, Recipe};

pub mod models;

pub type DbPool = SqlitePool;

pub async fn init(cfg: &Config) -> Result<DbPool> {
    let in_memory = cfg.database.path == ":memory:";
    let db_url = if in_memory {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite://{}?mode=rwc", cfg.database.path)
    };

    // An in-memory database exists per connection, so it must stay on one.
    let max_connections = if in_memory { 1 } else { 10 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(
            SqliteConnectOptions::from_str(&db_url)?
                .create_if_missing(true)
                .foreign_keys(true),
        )
        .await?;

    migrate(&pool).await?;

    if !in_memory {
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;
    }

    tracing::info!("Database connected: {}", cfg.database.path);

    if cfg.database.reset_on_start {
        reset(&pool).await?;
    }

    Ok(pool)
}

pub async fn migrate(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./src/db/migrations").run(pool).await?;
    Ok(())
}

/// Opens a transaction holding the write lock from the start. Concurrent
/// writers then wait on the busy timeout instead of failing with SQLITE_BUSY
/// when a deferred read lock cannot be upgraded.
pub async fn begin_write(pool: &DbPool) -> sqlx::Result<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Drops every drink and seeds the demo "water" drink, in one transaction.
pub async fn reset(pool: &DbPool) -> Result<()> {
    let recipe = Recipe::from_value(serde_json::to_value(vec![Ingredient {
        name: "water".to_string(),
        color: "blue".to_string(),
        parts: 1,
    }])?)?;

    let mut tx = begin_write(pool).await?;
    sqlx::query("DELETE FROM drinks").execute(&mut *tx).await?;
    sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
        .bind("water")
        .bind(recipe.to_json()?)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::warn!("Drinks table reset; seeded demo drink 'water'");
    Ok(())
}
