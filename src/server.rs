//! HTTP surface: router, shared state, error mapping and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::db::{Pool, StoreError};
use crate::handlers;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
}

/// Errors a handler can return, mapped onto HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Storage failed at query time (500, logged).
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Storage(e) => {
                // Log the actual error, return a generic message
                error!("storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "storage_unavailable",
                        "message": "the backing store is unavailable"
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// Build the router: the two read endpoints, the liveness probe, any-origin
/// CORS and request tracing.
pub fn router(pool: Pool) -> Router {
    let state = Arc::new(AppState { pool });
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/classes", get(handlers::list_classes))
        .route("/api/students", get(handlers::list_students))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router(pool)` on an already-bound listener until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, pool: Pool) -> std::io::Result<()> {
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!(?addr, "server listening");
    axum::serve(listener, router(pool))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(?err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(?err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, starting shutdown"),
        _ = terminate => info!("received SIGTERM, starting shutdown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn store_error_converts_and_displays_cause() {
        let err = ApiError::from(StoreError::Unavailable(sqlx::Error::PoolClosed));
        assert!(matches!(err, ApiError::Storage(StoreError::Unavailable(_))));
        assert!(err.to_string().starts_with("storage unavailable"));
    }

    #[tokio::test]
    async fn storage_error_is_500_without_details() {
        let err = ApiError::Storage(StoreError::Unavailable(sqlx::Error::PoolClosed));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["error"], "storage_unavailable");
        assert!(!v["message"].as_str().unwrap().contains("closed"));
    }
}
