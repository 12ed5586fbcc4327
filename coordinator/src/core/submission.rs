//! Job submission engine
//!
//! Turns one inbound request into a published job descriptor, waits for the
//! matching result and advances the cursor. Submissions are serialised: the
//! store has a single trigger slot, so only one job may be in flight.

use std::sync::Arc;

use serde_json::{Map, Value};
use shared::{JobDescriptor, JobIndex, ProcessId, ResultPayload, process_debug, process_info, process_warn};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::awaiting::{AwaitOutcome, ResultAwaiter, WaitPolicy};
use crate::error::CoordinatorError;
use crate::traits::{ArtifactStore, CursorStore};

/// Request body key selecting custom mode
pub const CUSTOM_PARAMS_FIELD: &str = "custom_params";

/// Parsed `POST /generate_next` body
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateRequest {
    /// Next index from the cursor
    Sequential,
    /// Caller-supplied parameters, addressed as index -1
    Custom(Map<String, Value>),
}

impl GenerateRequest {
    /// Interpret a raw request body. An empty body, a missing or `null`
    /// `custom_params`, or an empty mapping all mean sequential mode.
    pub fn from_body(body: &[u8]) -> Result<Self, SubmitError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(GenerateRequest::Sequential);
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| SubmitError::InvalidBody(e.to_string()))?;
        let Value::Object(mut fields) = value else {
            return Err(SubmitError::InvalidBody("expected a JSON object".to_string()));
        };

        match fields.remove(CUSTOM_PARAMS_FIELD) {
            None | Some(Value::Null) => Ok(GenerateRequest::Sequential),
            Some(Value::Object(params)) if params.is_empty() => Ok(GenerateRequest::Sequential),
            Some(Value::Object(params)) => Ok(GenerateRequest::Custom(params)),
            Some(_) => Err(SubmitError::CustomParamsNotObject),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSettings {
    /// Sequential jobs are assigned while the cursor stays below this bound
    pub total_samples: u64,
    /// Keys every `custom_params` mapping must carry
    pub required_custom_fields: Vec<String>,
    pub wait: WaitPolicy,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            total_samples: 1000,
            required_custom_fields: Vec::new(),
            wait: WaitPolicy::default(),
        }
    }
}

/// A job that produced a well-formed result
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(Value),
    /// The worker wrote an `error` field; surfaced as-is, never retried
    WorkerFailed(Value),
}

impl JobOutcome {
    fn from_payload(payload: ResultPayload) -> Self {
        if payload.is_failure() {
            JobOutcome::WorkerFailed(payload.into_value())
        } else {
            JobOutcome::Completed(payload.into_value())
        }
    }
}

/// Why a submission did not yield a result
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("custom_params must be a JSON object")]
    CustomParamsNotObject,

    #[error("Missing required fields: {}", format_field_list(.0))]
    MissingFields(Vec<String>),

    #[error("All samples generated")]
    SamplesExhausted { index: u64 },

    #[error("Failed to trigger generation: {0}")]
    Publish(#[source] CoordinatorError),

    #[error("Error processing result: {0}")]
    CorruptResult(String),

    #[error("Timeout waiting for video generation")]
    Timeout,

    #[error("Failed to update index: {0}")]
    CursorUpdate(#[source] CoordinatorError),

    #[error("Generation task failed: {0}")]
    TaskFailed(String),
}

impl SubmitError {
    /// Client mistakes, rejected before any artifact is touched
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SubmitError::InvalidBody(_)
                | SubmitError::CustomParamsNotObject
                | SubmitError::MissingFields(_)
                | SubmitError::SamplesExhausted { .. }
        )
    }
}

/// Renders `['a', 'b']`, the list format existing clients already parse
fn format_field_list(fields: &[String]) -> String {
    let quoted: Vec<String> = fields.iter().map(|field| format!("'{field}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// Coordinator side of the rendezvous
pub struct SubmissionEngine<C, A> {
    cursor: Arc<C>,
    store: Arc<A>,
    awaiter: ResultAwaiter<A>,
    settings: SubmissionSettings,
    in_flight: Mutex<()>,
}

impl<C, A> SubmissionEngine<C, A>
where
    C: CursorStore,
    A: ArtifactStore,
{
    pub fn new(cursor: Arc<C>, store: Arc<A>, settings: SubmissionSettings) -> Self {
        let awaiter = ResultAwaiter::new(store.clone(), settings.wait);
        Self {
            cursor,
            store,
            awaiter,
            settings,
            in_flight: Mutex::new(()),
        }
    }

    /// Run one job to completion.
    ///
    /// Concurrent callers queue here; each holds the trigger slot from publish
    /// until its result is consumed and the cursor has moved.
    pub async fn submit(&self, request: GenerateRequest) -> Result<JobOutcome, SubmitError> {
        if let GenerateRequest::Custom(params) = &request {
            self.validate_custom(params)?;
        }

        let _slot = self.in_flight.lock().await;

        let descriptor = match request {
            GenerateRequest::Custom(params) => {
                let rendered = Value::Object(params.clone());
                process_info!(ProcessId::current(), "🎨 Received custom generation request");
                process_debug!(ProcessId::current(), "Custom parameters: {}", rendered);
                JobDescriptor::custom(params)
            }
            GenerateRequest::Sequential => {
                let index = self.cursor.read().await;
                if index >= self.settings.total_samples {
                    process_info!(
                        ProcessId::current(),
                        "All {} samples generated, rejecting request",
                        self.settings.total_samples
                    );
                    return Err(SubmitError::SamplesExhausted { index });
                }
                process_info!(ProcessId::current(), "🎬 Triggering generation for index {}", index);
                JobDescriptor::sequential(index)
            }
        };

        let request_id = Uuid::new_v4();
        let index = descriptor.index;
        let descriptor = descriptor.with_request_id(request_id);

        self.purge_leftover_result(index).await;

        self.store
            .publish_trigger(&descriptor)
            .await
            .map_err(SubmitError::Publish)?;
        process_info!(
            ProcessId::current(),
            "📝 Trigger written for job {} (request {})",
            index,
            request_id
        );

        match self.awaiter.await_result(index, request_id).await {
            AwaitOutcome::Consumed(payload) => {
                self.retire_trigger().await;
                if let Some(next) = index.next() {
                    self.cursor.write(next).await.map_err(SubmitError::CursorUpdate)?;
                    process_info!(ProcessId::current(), "➡️ Index updated to {}", next);
                }
                Ok(JobOutcome::from_payload(payload))
            }
            AwaitOutcome::Corrupt(detail) => Err(SubmitError::CorruptResult(detail)),
            AwaitOutcome::TimedOut => Err(SubmitError::Timeout),
        }
    }

    fn validate_custom(&self, params: &Map<String, Value>) -> Result<(), SubmitError> {
        let missing: Vec<String> = self
            .settings
            .required_custom_fields
            .iter()
            .filter(|field| !params.contains_key(field.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SubmitError::MissingFields(missing))
        }
    }

    /// An orphan from an abandoned request must not answer this one
    async fn purge_leftover_result(&self, index: JobIndex) {
        match self.store.remove_result(index).await {
            Ok(true) => process_warn!(
                ProcessId::current(),
                "⚠️ Removed leftover result for job {} before publishing",
                index
            ),
            Ok(false) => {}
            Err(e) => process_warn!(
                ProcessId::current(),
                "⚠️ Could not remove leftover result for job {}: {}",
                index,
                e
            ),
        }
    }

    /// The job is answered; a trigger the worker left behind would re-fire it
    async fn retire_trigger(&self) {
        if !self.store.trigger_exists().await {
            return;
        }
        match self.store.remove_trigger().await {
            Ok(_) => process_debug!(ProcessId::current(), "🗑️ Removed answered trigger"),
            Err(e) => process_warn!(ProcessId::current(), "⚠️ Could not remove answered trigger: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockArtifactStore, MockCursorStore, ResultRead};
    use serde_json::json;
    use std::time::Duration;

    fn settings(total_samples: u64) -> SubmissionSettings {
        SubmissionSettings {
            total_samples,
            required_custom_fields: Vec::new(),
            wait: WaitPolicy::new(Duration::from_millis(5), Duration::from_millis(50)),
        }
    }

    fn io_error() -> CoordinatorError {
        CoordinatorError::IoError(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))
    }

    #[test]
    fn test_body_parsing_modes() {
        assert_eq!(GenerateRequest::from_body(b"").unwrap(), GenerateRequest::Sequential);
        assert_eq!(GenerateRequest::from_body(b"  \n").unwrap(), GenerateRequest::Sequential);
        assert_eq!(GenerateRequest::from_body(b"{}").unwrap(), GenerateRequest::Sequential);
        assert_eq!(
            GenerateRequest::from_body(br#"{"custom_params": null}"#).unwrap(),
            GenerateRequest::Sequential
        );
        assert_eq!(
            GenerateRequest::from_body(br#"{"custom_params": {}}"#).unwrap(),
            GenerateRequest::Sequential
        );

        match GenerateRequest::from_body(br#"{"custom_params": {"x": 1}}"#).unwrap() {
            GenerateRequest::Custom(params) => assert_eq!(params["x"], json!(1)),
            other => panic!("expected custom request, got {other:?}"),
        }
    }

    #[test]
    fn test_body_parsing_rejections() {
        assert!(matches!(
            GenerateRequest::from_body(b"{not json"),
            Err(SubmitError::InvalidBody(_))
        ));
        assert!(matches!(
            GenerateRequest::from_body(b"[1]"),
            Err(SubmitError::InvalidBody(_))
        ));
        assert!(matches!(
            GenerateRequest::from_body(br#"{"custom_params": "fast"}"#),
            Err(SubmitError::CustomParamsNotObject)
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SubmitError::MissingFields(vec!["prompt".to_string(), "seed".to_string()]).to_string(),
            "Missing required fields: ['prompt', 'seed']"
        );
        assert_eq!(
            SubmitError::Timeout.to_string(),
            "Timeout waiting for video generation"
        );
        assert_eq!(
            SubmitError::SamplesExhausted { index: 3 }.to_string(),
            "All samples generated"
        );
        assert!(SubmitError::Publish(io_error()).to_string().starts_with("Failed to trigger generation: "));
        assert!(SubmitError::SamplesExhausted { index: 3 }.is_client_error());
        assert!(!SubmitError::Timeout.is_client_error());
    }

    #[tokio::test]
    async fn test_exhausted_bound_touches_nothing() {
        let mut cursor = MockCursorStore::new();
        cursor.expect_read().times(1).returning(|| 3);
        cursor.expect_write().never();

        let mut store = MockArtifactStore::new();
        store.expect_publish_trigger().never();
        store.expect_remove_result().never();

        let engine = SubmissionEngine::new(Arc::new(cursor), Arc::new(store), settings(3));
        let result = engine.submit(GenerateRequest::Sequential).await;

        assert!(matches!(result, Err(SubmitError::SamplesExhausted { index: 3 })));
    }

    #[tokio::test]
    async fn test_missing_custom_fields_fail_fast() {
        let mut cursor = MockCursorStore::new();
        cursor.expect_read().never();

        let mut store = MockArtifactStore::new();
        store.expect_publish_trigger().never();

        let mut config = settings(3);
        config.required_custom_fields = vec!["prompt".to_string(), "seed".to_string()];
        let engine = SubmissionEngine::new(Arc::new(cursor), Arc::new(store), config);

        let params = json!({ "seed": 7 }).as_object().unwrap().clone();
        match engine.submit(GenerateRequest::Custom(params)).await {
            Err(SubmitError::MissingFields(missing)) => assert_eq!(missing, vec!["prompt".to_string()]),
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_failure_skips_wait_and_cursor() {
        let mut cursor = MockCursorStore::new();
        cursor.expect_read().returning(|| 0);
        cursor.expect_write().never();

        let mut store = MockArtifactStore::new();
        store.expect_remove_result().returning(|_| Ok(false));
        store.expect_publish_trigger().times(1).returning(|_| Err(io_error()));
        store.expect_read_result().never();

        let engine = SubmissionEngine::new(Arc::new(cursor), Arc::new(store), settings(3));
        let result = engine.submit(GenerateRequest::Sequential).await;

        assert!(matches!(result, Err(SubmitError::Publish(_))));
    }

    #[tokio::test]
    async fn test_success_advances_cursor_after_consuming_result() {
        let mut seq = mockall::Sequence::new();
        let mut cursor = MockCursorStore::new();
        let mut store = MockArtifactStore::new();

        cursor.expect_read().times(1).in_sequence(&mut seq).returning(|| 2);
        // Leftover purge before publishing, consumption after reading
        store.expect_remove_result().times(2).returning(|_| Ok(true));
        store
            .expect_publish_trigger()
            .withf(|descriptor| descriptor.index == JobIndex::Sequential(2) && descriptor.request_id.is_some())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_read_result()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ResultRead::Ready(ResultPayload::from(json!({ "ok": true }).as_object().unwrap().clone())));
        store
            .expect_trigger_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| false);
        cursor
            .expect_write()
            .withf(|index| *index == 3)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let engine = SubmissionEngine::new(Arc::new(cursor), Arc::new(store), settings(10));
        let outcome = engine.submit(GenerateRequest::Sequential).await.unwrap();

        assert_eq!(outcome, JobOutcome::Completed(json!({ "ok": true })));
    }

    #[tokio::test]
    async fn test_worker_failure_still_advances_cursor() {
        let mut cursor = MockCursorStore::new();
        cursor.expect_read().returning(|| 0);
        cursor.expect_write().withf(|index| *index == 1).times(1).returning(|_| Ok(()));

        let mut store = MockArtifactStore::new();
        store.expect_remove_result().returning(|_| Ok(true));
        store.expect_publish_trigger().returning(|_| Ok(()));
        store
            .expect_read_result()
            .returning(|_| ResultRead::Ready(ResultPayload::from(json!({ "error": "oom" }).as_object().unwrap().clone())));
        store.expect_trigger_exists().returning(|| false);

        let engine = SubmissionEngine::new(Arc::new(cursor), Arc::new(store), settings(10));
        let outcome = engine.submit(GenerateRequest::Sequential).await.unwrap();

        assert_eq!(outcome, JobOutcome::WorkerFailed(json!({ "error": "oom" })));
    }

    #[tokio::test]
    async fn test_cursor_write_failure_is_loud() {
        let mut cursor = MockCursorStore::new();
        cursor.expect_read().returning(|| 0);
        cursor.expect_write().times(1).returning(|_| Err(io_error()));

        let mut store = MockArtifactStore::new();
        store.expect_remove_result().returning(|_| Ok(true));
        store.expect_publish_trigger().returning(|_| Ok(()));
        store
            .expect_read_result()
            .returning(|_| ResultRead::Ready(ResultPayload::from(json!({ "ok": true }).as_object().unwrap().clone())));
        store.expect_trigger_exists().returning(|| false);

        let engine = SubmissionEngine::new(Arc::new(cursor), Arc::new(store), settings(10));
        let result = engine.submit(GenerateRequest::Sequential).await;

        assert!(matches!(result, Err(SubmitError::CursorUpdate(_))));
    }

    #[tokio::test]
    async fn test_custom_job_never_touches_cursor() {
        let mut cursor = MockCursorStore::new();
        cursor.expect_read().never();
        cursor.expect_write().never();

        let mut store = MockArtifactStore::new();
        store.expect_remove_result().returning(|_| Ok(false));
        store
            .expect_publish_trigger()
            .withf(|descriptor| descriptor.index == JobIndex::Custom && descriptor.custom_params.is_some())
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_read_result()
            .withf(|index| *index == JobIndex::Custom)
            .returning(|_| ResultRead::Ready(ResultPayload::from(json!({ "video": "out.mp4" }).as_object().unwrap().clone())));
        store.expect_trigger_exists().returning(|| true);
        store.expect_remove_trigger().times(1).returning(|| Ok(true));

        let engine = SubmissionEngine::new(Arc::new(cursor), Arc::new(store), settings(0));
        let params = json!({ "x": 1 }).as_object().unwrap().clone();
        let outcome = engine.submit(GenerateRequest::Custom(params)).await.unwrap();

        assert_eq!(outcome, JobOutcome::Completed(json!({ "video": "out.mp4" })));
    }

    #[tokio::test]
    async fn test_timeout_leaves_cursor_untouched() {
        let mut cursor = MockCursorStore::new();
        cursor.expect_read().returning(|| 5);
        cursor.expect_write().never();

        let mut store = MockArtifactStore::new();
        store.expect_remove_result().returning(|_| Ok(false));
        store.expect_publish_trigger().returning(|_| Ok(()));
        store.expect_read_result().returning(|_| ResultRead::Missing);
        store.expect_trigger_exists().returning(|| true);
        store.expect_remove_trigger().times(1).returning(|| Ok(true));

        let engine = SubmissionEngine::new(Arc::new(cursor), Arc::new(store), settings(10));
        let result = engine.submit(GenerateRequest::Sequential).await;

        assert!(matches!(result, Err(SubmitError::Timeout)));
    }
}
