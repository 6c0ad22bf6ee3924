//! Web server exposing read-only news lookups.
//!
//! Routes:
//! - `GET /stocks/{symbol}`: articles filed under a ticker
//! - `GET /articles/{source_name}/{company}`: company search, enveloped
//! - `GET /health`: store reachability

mod handlers;
mod routes;

pub use handlers::api_types::ErrorBody;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::NewsService;
use crate::store::{MongoStore, MongoStoreOptions};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub news: Arc<NewsService>,
}

impl AppState {
    pub fn new(news: NewsService) -> Self {
        Self {
            news: Arc::new(news),
        }
    }

    /// Connect to the configured database and build the lookup service.
    pub async fn connect(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(connect_news_service(settings).await?))
    }
}

/// Connect to MongoDB and wire a [`NewsService`] over it.
pub async fn connect_news_service(settings: &Settings) -> anyhow::Result<NewsService> {
    tracing::info!("Connecting to {}", settings.redacted_mongo_uri());
    let store = MongoStore::connect(&MongoStoreOptions {
        uri: settings.mongo_uri.clone(),
        database: settings.database.clone(),
        connect_timeout: settings.connect_timeout,
    })
    .await
    .map_err(|e| {
        anyhow::anyhow!(
            "Cannot reach MongoDB at {}: {}",
            settings.redacted_mongo_uri(),
            e
        )
    })?;

    tracing::info!("Connected to database '{}'", store.database_name());

    let sources = settings.source_registry()?;
    tracing::info!(
        "Sources with dedicated collections: {}",
        sources.names().join(", ")
    );
    Ok(NewsService::new(Arc::new(store), sources).with_max_limit(settings.max_limit))
}

/// Start the web server.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
