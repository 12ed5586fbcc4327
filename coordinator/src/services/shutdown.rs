//! Termination signal handling and worker notification

use std::sync::Arc;

use shared::{ProcessId, logging};

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::traits::ArtifactStore;

/// Wait for SIGINT or SIGTERM and report which one arrived
#[cfg(unix)]
pub async fn wait_for_signal() -> CoordinatorResult<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate()).map_err(|e| CoordinatorError::SignalError {
        message: e.to_string(),
    })?;
    let mut interrupt = signal(SignalKind::interrupt()).map_err(|e| CoordinatorError::SignalError {
        message: e.to_string(),
    })?;

    tokio::select! {
        _ = terminate.recv() => Ok("SIGTERM"),
        _ = interrupt.recv() => Ok("SIGINT"),
    }
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> CoordinatorResult<&'static str> {
    tokio::signal::ctrl_c().await.map_err(|e| CoordinatorError::SignalError {
        message: e.to_string(),
    })?;
    Ok("Ctrl+C")
}

/// Tells the worker to exit by dropping the shutdown marker into the store
pub struct ShutdownCoordinator<A> {
    store: Arc<A>,
}

impl<A: ArtifactStore> ShutdownCoordinator<A> {
    pub fn new(store: Arc<A>) -> Self {
        Self { store }
    }

    /// Best-effort: a failed write is logged and shutdown proceeds anyway.
    /// Returns whether the marker was written.
    pub async fn notify_worker(&self, reason: &str) -> bool {
        logging::log_shutdown(ProcessId::current(), reason);

        match self.store.write_shutdown_marker().await {
            Ok(()) => {
                logging::log_success(ProcessId::current(), "Shutdown signal sent to worker");
                true
            }
            Err(e) => {
                logging::log_error(ProcessId::current(), "Sending shutdown signal to worker", &e);
                false
            }
        }
    }
}
