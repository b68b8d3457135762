//! Database bootstrap against a real SQLite file.

use coffee_shop::config::{ApiConfig, AuthConfig, Config, DatabaseConfig};
use coffee_shop::db;
use coffee_shop::db::models::drink::Drink;

fn config_for(path: &std::path::Path, reset_on_start: bool) -> Config {
    Config {
        api: ApiConfig {
            bind: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            path: path.to_string_lossy().into_owned(),
            reset_on_start,
        },
        auth: AuthConfig {
            domain: "coffee-shop.test".to_string(),
            audience: "coffee_shop".to_string(),
            jwks_url: None,
            jwks_timeout_secs: 5,
        },
    }
}

async fn titles(pool: &db::DbPool) -> Vec<String> {
    let drinks: Vec<Drink> = sqlx::query_as("SELECT id, title, recipe FROM drinks ORDER BY id")
        .fetch_all(pool)
        .await
        .expect("query drinks");
    drinks.into_iter().map(|d| d.title).collect()
}

#[tokio::test]
async fn test_init_creates_empty_database_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("coffee.db");

    let pool = db::init(&config_for(&path, false)).await.expect("init");
    assert!(path.exists());
    assert!(titles(&pool).await.is_empty());
}

#[tokio::test]
async fn test_reset_on_start_seeds_water_and_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("coffee.db");

    let pool = db::init(&config_for(&path, true)).await.expect("init with reset");
    sqlx::query("INSERT INTO drinks (title, recipe) VALUES ('Cortado', '[]')")
        .execute(&pool)
        .await
        .expect("insert");
    pool.close().await;

    // Reopening without reset keeps rows; migrations are idempotent.
    let pool = db::init(&config_for(&path, false)).await.expect("reopen");
    assert_eq!(titles(&pool).await, vec!["water", "Cortado"]);
    pool.close().await;

    let pool = db::init(&config_for(&path, true)).await.expect("reopen with reset");
    assert_eq!(titles(&pool).await, vec!["water"]);
}

#[tokio::test]
async fn test_init_in_memory() {
    let pool = db::init(&config_for(std::path::Path::new(":memory:"), true))
        .await
        .expect("in-memory init");
    assert_eq!(titles(&pool).await, vec!["water"]);
}
