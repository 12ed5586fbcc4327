//! REST API handlers
//!
//! `GET /health` and `POST /generate_next`. Worker payloads are passed through
//! untouched; only coordinator-side failures get an `{error}` body of our own.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};
use shared::{ProcessId, process_error, process_info};

use crate::coordinator_impl::Coordinator;
use crate::core::{GenerateRequest, JobOutcome, SubmitError};
use crate::traits::{ArtifactStore, CursorStore};

/// Health check endpoint: healthy iff the shared store is writable
pub async fn health_check<C, A>(State(coordinator): State<Coordinator<C, A>>) -> Json<Value>
where
    C: CursorStore + 'static,
    A: ArtifactStore + 'static,
{
    let worker_ready = coordinator.store().is_writable().await;

    Json(json!({
        "status": if worker_ready { "healthy" } else { "unhealthy" },
        "worker_ready": worker_ready
    }))
}

/// Generate the next sample, or a custom one when `custom_params` is given.
/// Blocks until the worker answers or the wait ceiling passes. The submission
/// runs on its own task and finishes even if the client hangs up.
pub async fn generate_next<C, A>(State(coordinator): State<Coordinator<C, A>>, body: Bytes) -> Response
where
    C: CursorStore + 'static,
    A: ArtifactStore + 'static,
{
    let request = match GenerateRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let engine = coordinator.engine();
    let submission = tokio::spawn(async move { engine.submit(request).await });

    match submission.await {
        Ok(Ok(outcome)) => outcome.into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(e) => SubmitError::TaskFailed(e.to_string()).into_response(),
    }
}

impl IntoResponse for JobOutcome {
    fn into_response(self) -> Response {
        match self {
            JobOutcome::Completed(payload) => {
                process_info!(ProcessId::current(), "✅ Generation completed");
                (StatusCode::OK, Json(payload)).into_response()
            }
            JobOutcome::WorkerFailed(payload) => {
                process_error!(ProcessId::current(), "❌ Worker reported failure: {}", payload);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
            }
        }
    }
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            process_error!(ProcessId::current(), "❌ Generation request failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = match &self {
            SubmitError::SamplesExhausted { index } => json!({ "error": self.to_string(), "index": index }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
