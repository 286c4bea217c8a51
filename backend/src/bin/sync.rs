//! One-shot spreadsheet sync
//!
//! Runs every table once against the configured database and exits
//! non-zero when any table failed.

use std::{sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_dashboard::{external, services::SyncService, store::PgStore, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_dashboard=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::load()?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    if config.environment == "development" {
        sqlx::migrate!("./migrations").run(&db_pool).await?;
    }

    let store = Arc::new(PgStore::new(db_pool));
    let source = external::source_from_config(&config.sheets)?;
    let report = SyncService::new(store, source).run().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_success() {
        anyhow::bail!("sync failed for tables: {:?}", report.failed_tables());
    }

    Ok(())
}
