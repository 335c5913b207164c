use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use garden_sim::{AppConfig, MemoryCache, PgStore, Scheduler, Simulation, catalog, db};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(config.log_filter.parse()?))
        .init();

    info!("garden-sim {} starting", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    db::migrate(&pool).await.context("failed to apply schema")?;

    let store = PgStore::new(pool);
    catalog::seed_catalog(&store).await?;

    let sim = Arc::new(Simulation::new(store, MemoryCache::new(), config.sim.clone()));
    let scheduler = Scheduler::start(sim);

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("shutdown requested");
    scheduler.stop().await;

    info!("garden-sim shutdown complete");
    Ok(())
}
