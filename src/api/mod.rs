//! HTTP API module for Notekeeper
//!
//! Provides the signup, login and note endpoints over the shared store.

mod auth;
pub mod routes;

use crate::error::{CoreError, Result};
use crate::store::Store;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Users, sessions and notes
    pub store: Arc<Store>,
}

/// Start the HTTP API server
pub async fn serve(addr: SocketAddr, store: Arc<Store>) -> Result<()> {
    let app = router(store);

    // Check if port is already in use (another instance running)
    if tokio::net::TcpStream::connect(addr).await.is_ok() {
        tracing::error!(
            "Port {} is already in use. Another notekeeper instance may be running.",
            addr.port()
        );
        return Err(CoreError::Api(format!("Port {} already in use", addr.port())));
    }

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CoreError::Api(e.to_string()))?;

    Ok(())
}

/// Build the API router over `store`
pub fn router(store: Arc<Store>) -> Router {
    let state = AppState { store };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/signup", post(routes::signup))
        .route("/login", post(routes::login))
        .route(
            "/notes",
            get(routes::list_notes)
                .post(routes::create_note)
                .delete(routes::delete_note),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
