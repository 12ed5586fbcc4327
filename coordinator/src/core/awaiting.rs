//! Result awaiting loop
//!
//! Fixed-interval polling of one result artifact under a wall-clock ceiling:
//!
//! ```text
//! WAITING --present, parses--> FOUND --> CONSUMED
//! WAITING --present, corrupt-> CORRUPT
//! WAITING --ceiling reached--> TIMED_OUT
//! ```
//!
//! Found artifacts are deleted before the outcome is returned, so each one is
//! consumed at most once.

use std::sync::Arc;
use std::time::Duration;

use shared::{JobIndex, ProcessId, ResultPayload, process_debug, process_info, process_warn};
use tokio::time::Instant;
use uuid::Uuid;

use crate::traits::{ArtifactStore, ResultRead};

/// Polling cadence and overall ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl WaitPolicy {
    pub fn new(poll_interval: Duration, max_wait: Duration) -> Self {
        Self {
            poll_interval,
            max_wait,
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(30_000),
        }
    }
}

/// Terminal state of one wait
#[derive(Debug, Clone, PartialEq)]
pub enum AwaitOutcome {
    /// Result read and removed; may still carry a worker-reported error
    Consumed(ResultPayload),
    /// Result present but unparsable; removal was attempted
    Corrupt(String),
    /// Nothing arrived in time; trigger removal was attempted
    TimedOut,
}

/// Waits for the result artifact matching a published trigger
pub struct ResultAwaiter<A> {
    store: Arc<A>,
    policy: WaitPolicy,
}

impl<A: ArtifactStore> ResultAwaiter<A> {
    pub fn new(store: Arc<A>, policy: WaitPolicy) -> Self {
        Self { store, policy }
    }

    /// Block until the result for `index` tagged with `request_id` shows up,
    /// turns out corrupt, or the ceiling passes
    pub async fn await_result(&self, index: JobIndex, request_id: Uuid) -> AwaitOutcome {
        let started = Instant::now();
        let deadline = started.checked_add(self.policy.max_wait).unwrap_or_else(|| far_future(started));

        loop {
            match self.store.read_result(index).await {
                ResultRead::Ready(payload) if !payload.matches_request(&request_id) => {
                    process_warn!(
                        ProcessId::current(),
                        "⚠️ Discarding orphaned result for job {} (request {:?}, expected {})",
                        index,
                        payload.request_id(),
                        request_id
                    );
                    self.discard_result(index).await;
                }
                ResultRead::Ready(payload) => {
                    process_info!(ProcessId::current(), "📥 Result for job {} found", index);
                    self.discard_result(index).await;
                    return AwaitOutcome::Consumed(payload);
                }
                ResultRead::Corrupt(detail) => {
                    process_warn!(
                        ProcessId::current(),
                        "⚠️ Corrupt result for job {}: {}",
                        index,
                        detail
                    );
                    self.discard_result(index).await;
                    return AwaitOutcome::Corrupt(detail);
                }
                ResultRead::Missing => {}
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep(self.policy.poll_interval.min(deadline - now)).await;
        }

        process_warn!(
            ProcessId::current(),
            "⏰ Timed out after {:?} waiting for job {}",
            self.policy.max_wait,
            index
        );
        self.withdraw_trigger().await;
        AwaitOutcome::TimedOut
    }

    /// Best-effort removal; failures are logged and never reach the client
    async fn discard_result(&self, index: JobIndex) {
        match self.store.remove_result(index).await {
            Ok(_) => process_debug!(ProcessId::current(), "🗑️ Result for job {} removed", index),
            Err(e) => process_warn!(
                ProcessId::current(),
                "⚠️ Failed to remove result for job {}: {}",
                index,
                e
            ),
        }
    }

    /// The worker never picked the job up (or is stuck); keep a stale trigger
    /// from firing later
    async fn withdraw_trigger(&self) {
        if !self.store.trigger_exists().await {
            return;
        }
        match self.store.remove_trigger().await {
            Ok(true) => process_info!(ProcessId::current(), "🗑️ Removed stale trigger after timeout"),
            Ok(false) => {}
            Err(e) => process_warn!(ProcessId::current(), "⚠️ Could not remove stale trigger: {}", e),
        }
    }
}

/// Stand-in deadline for ceilings too large to add to the clock
fn far_future(now: Instant) -> Instant {
    now + Duration::from_secs(86_400 * 365 * 30)
}
