//! Service trait definitions for dependency injection
//!
//! All shared store I/O goes through these traits so the rendezvous logic can
//! be exercised against mocks.

use async_trait::async_trait;
use shared::{JobDescriptor, JobIndex, ResultPayload};

use crate::error::CoordinatorResult;

/// What a single look at a result artifact found
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRead {
    /// Nothing written yet
    Missing,
    /// Artifact present and well-formed
    Ready(ResultPayload),
    /// Artifact present but unreadable or not a JSON object
    Corrupt(String),
}

/// Persisted next-sequential-index counter
#[mockall::automock]
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Create the backing artifact with `0` if it does not exist yet
    async fn initialize(&self) -> CoordinatorResult<()>;

    /// Current cursor; `0` when the artifact is missing or unparsable
    async fn read(&self) -> u64;

    /// Overwrite the cursor. Failures must reach the caller.
    async fn write(&self, index: u64) -> CoordinatorResult<()>;
}

/// Trigger, result and shutdown artifacts inside the shared store
#[mockall::automock]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Create the store directory if needed
    async fn prepare(&self) -> CoordinatorResult<()>;

    /// Write the descriptor to the staging path and rename it onto the trigger path
    async fn publish_trigger(&self, descriptor: &JobDescriptor) -> CoordinatorResult<()>;

    async fn trigger_exists(&self) -> bool;

    /// Remove the trigger; `Ok(false)` when there was none
    async fn remove_trigger(&self) -> CoordinatorResult<bool>;

    /// Look at the result artifact for `index` once
    async fn read_result(&self, index: JobIndex) -> ResultRead;

    /// Remove the result artifact for `index`; `Ok(false)` when there was none
    async fn remove_result(&self, index: JobIndex) -> CoordinatorResult<bool>;

    async fn write_shutdown_marker(&self) -> CoordinatorResult<()>;

    /// Remove a shutdown marker left by an earlier run; `Ok(false)` when there was none
    async fn clear_shutdown_marker(&self) -> CoordinatorResult<bool>;

    /// Store directory exists and can be written to
    async fn is_writable(&self) -> bool;
}
