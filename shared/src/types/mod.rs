//! Core types used on both sides of the shared store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::errors::SharedError;

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Process identifier for any component touching the shared store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// HTTP-facing coordinator (singleton)
    Coordinator,
    /// Generation worker reached through the store
    Worker,
}

impl ProcessId {
    /// Initialize the global process ID for the coordinator
    pub fn init_coordinator() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Coordinator)
    }

    /// Get the global process ID, falling back to the coordinator when
    /// nothing was initialised (library use, tests)
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&ProcessId::Coordinator)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Coordinator => write!(f, "coordinator"),
            ProcessId::Worker => write!(f, "worker"),
        }
    }
}

/// Sentinel index written to the trigger for custom jobs
pub const CUSTOM_INDEX: i64 = -1;

/// Address of a generation job.
///
/// On the wire this is a plain integer: sequential jobs use their cursor
/// position, custom jobs use `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum JobIndex {
    Sequential(u64),
    Custom,
}

impl JobIndex {
    /// Index the cursor should hold once this job has been consumed
    pub fn next(&self) -> Option<u64> {
        match self {
            JobIndex::Sequential(index) => Some(index + 1),
            JobIndex::Custom => None,
        }
    }

    /// Name of the result artifact the worker writes for this job
    pub fn result_file_name(&self) -> String {
        format!("result_{}.json", self.result_key())
    }

    fn result_key(&self) -> String {
        match self {
            JobIndex::Sequential(index) => index.to_string(),
            JobIndex::Custom => "custom".to_string(),
        }
    }
}

impl From<JobIndex> for i64 {
    fn from(index: JobIndex) -> Self {
        match index {
            JobIndex::Sequential(index) => index as i64,
            JobIndex::Custom => CUSTOM_INDEX,
        }
    }
}

impl TryFrom<i64> for JobIndex {
    type Error = SharedError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            CUSTOM_INDEX => Ok(JobIndex::Custom),
            v if v >= 0 => Ok(JobIndex::Sequential(v as u64)),
            v => Err(SharedError::InvalidJobIndex { value: v }),
        }
    }
}

impl fmt::Display for JobIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobIndex::Sequential(index) => write!(f, "{index}"),
            JobIndex::Custom => write!(f, "custom"),
        }
    }
}
