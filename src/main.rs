use anyhow::Result;
use tracing::info;

use coffee_shop::{api, config, db};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coffee_shop=info".parse()?)
                .add_directive("tower_http=info".parse()?)
        )
        .init();

    info!("Starting Coffee Shop API v{}", env!("CARGO_PKG_VERSION"));

    let cfg = config::load()?;
    info!("Configuration loaded");

    let db_pool = db::init(&cfg).await?;
    info!("Database initialized");

    api::serve(cfg, db_pool).await?;

    info!("Coffee Shop API stopped");
    Ok(())
}
