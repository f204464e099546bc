use baladiya::config::Config;
use baladiya::{routes, schema, AppState};
use color_eyre::Result;
use sea_orm::Database;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::new()?;
    let database = Database::connect(config.database_url()).await?;
    schema::migrate(&database).await?;

    let addr: SocketAddr = config.bind_addr().parse()?;
    info!(
        %addr,
        disk = config.storage_disk(),
        storage = %config.storage_root().display(),
        "starting"
    );

    let state = Arc::new(AppState::new(database, config)?);
    axum::Server::bind(&addr)
        .serve(routes::router(state).into_make_service())
        .await?;

    Ok(())
}
