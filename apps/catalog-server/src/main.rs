//! Film catalogue server binary.

use std::net::SocketAddr;

use catalog_server::{config::Config, create_app, create_state, init_tracing};
use catalog_store::{CatalogStore, MemoryCatalogStore, SqliteCatalogStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    match config.database_url.clone() {
        Some(url) => {
            tracing::info!(database_url = %url, "Starting catalogue server with SQLite store");
            let store = SqliteCatalogStore::connect(&url).await?;
            serve(config, store).await
        }
        None => {
            tracing::info!("Starting catalogue server with in-memory store");
            serve(config, MemoryCatalogStore::new()).await
        }
    }
}

async fn serve<S: CatalogStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    let addr: SocketAddr = config.server_addr().parse()?;
    let app = create_app(create_state(store));

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
