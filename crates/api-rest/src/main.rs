//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, over an empty in-memory store.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST server
//! (with OpenAPI/Swagger UI). The workspace's main `vetdesk-run` binary also
//! seeds demo records so the endpoints can be exercised immediately.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use vetdesk_core::{CoreConfig, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("VETDESK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting vetdesk REST API on {}", addr);

    let store = Arc::new(MemoryStore::new());
    let cfg = Arc::new(CoreConfig::default());
    let app = router(AppState::in_memory(store, cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
