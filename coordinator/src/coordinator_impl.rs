//! Main coordinator implementation
//!
//! Wires the store services, the submission engine and the HTTP routes
//! together using dependency injection, and owns the process lifecycle.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use shared::{ProcessId, logging, process_info, process_warn};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::{SubmissionEngine, SubmissionSettings};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::services::{ShutdownCoordinator, wait_for_signal};
use crate::traits::{ArtifactStore, CursorStore};
use crate::web::handlers::{generate_next, health_check};

/// HTTP-facing side of the rendezvous
pub struct Coordinator<C, A> {
    engine: Arc<SubmissionEngine<C, A>>,
    cursor: Arc<C>,
    store: Arc<A>,
}

impl<C, A> Clone for Coordinator<C, A> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            cursor: self.cursor.clone(),
            store: self.store.clone(),
        }
    }
}

impl<C, A> Coordinator<C, A>
where
    C: CursorStore + 'static,
    A: ArtifactStore + 'static,
{
    /// Create a new coordinator with dependency injection
    pub fn new(cursor: C, store: A, settings: SubmissionSettings) -> Self {
        let cursor = Arc::new(cursor);
        let store = Arc::new(store);
        let engine = Arc::new(SubmissionEngine::new(cursor.clone(), store.clone(), settings));

        Self { engine, cursor, store }
    }

    pub fn engine(&self) -> Arc<SubmissionEngine<C, A>> {
        self.engine.clone()
    }

    pub fn store(&self) -> &A {
        &self.store
    }

    /// Make sure the store directory and cursor exist, and drop a shutdown
    /// marker left behind by a previous run
    pub async fn prepare_store(&self) -> CoordinatorResult<()> {
        self.store.prepare().await?;
        self.cursor.initialize().await?;

        if self.store.clear_shutdown_marker().await? {
            process_warn!(ProcessId::current(), "⚠️ Removed stale shutdown marker from a previous run");
        }

        process_info!(
            ProcessId::current(),
            "📋 Store ready, next index {}",
            self.cursor.read().await
        );
        Ok(())
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check::<C, A>))
            .route("/generate_next", post(generate_next::<C, A>))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.clone())
    }

    /// Serve until SIGINT/SIGTERM, then notify the worker and return.
    /// Waits still in flight are abandoned.
    pub async fn run(&self, address: SocketAddr) -> CoordinatorResult<()> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| CoordinatorError::ServerStartupFailed {
                address: address.to_string(),
                message: e.to_string(),
            })?;

        logging::log_startup(ProcessId::current(), &format!("HTTP API on http://{address}"));

        let server = axum::serve(listener, self.build_router()).into_future();

        tokio::select! {
            result = server => {
                result?;
                process_info!(ProcessId::current(), "HTTP server task completed");
            }
            reason = shutdown_requested() => {
                ShutdownCoordinator::new(self.store.clone()).notify_worker(&reason).await;
            }
        }

        Ok(())
    }
}

/// Resolves on the first termination signal. If handlers cannot be
/// installed the server keeps running without them.
async fn shutdown_requested() -> String {
    match wait_for_signal().await {
        Ok(signal) => format!("Received {signal}"),
        Err(e) => {
            logging::log_error(ProcessId::current(), "Signal handling", &e);
            std::future::pending::<String>().await
        }
    }
}
