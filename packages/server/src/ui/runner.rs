//! Router construction and server startup.

use std::sync::Arc;

use axum::{Router, routing::get};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::{
        auth::JwtTokenVerifier,
        repository::{SeedData, SeedError, SqliteStore},
    },
    ui::{
        config::ServerConfig,
        handler::{get_presence, get_room_detail, get_rooms, health_check, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
};

/// Errors that stop the server from starting or serving
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to open database: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to seed database: {0}")]
    Seed(#[from] SeedError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/presence", get(get_presence))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the store, bind and serve until a shutdown signal arrives
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let verifier = Arc::new(JwtTokenVerifier::new(config.jwt_secret.as_bytes()));
    let store = Arc::new(SqliteStore::open(&config.database)?);
    if let Some(path) = &config.seed {
        SeedData::load(path)?.apply(&store).await?;
        tracing::info!(seed = %path.display(), "database seeded");
    }
    tracing::info!(database = %config.database.display(), "database ready");

    let app = build_router(Arc::new(AppState::new(verifier, store)));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("server stopped");
    Ok(())
}
