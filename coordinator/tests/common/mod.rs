//! Shared helpers for coordinator integration tests

#![allow(dead_code)]

pub mod worker;

use std::time::Duration;

use coordinator::{
    Coordinator, FileArtifactStore, FileCursorStore,
    core::{SubmissionSettings, WaitPolicy},
};
use shared::StoreLayout;
use tempfile::TempDir;

pub use worker::{SimulatedWorker, WorkerBehavior};

pub type FileCoordinator = Coordinator<FileCursorStore, FileArtifactStore>;

/// Poll fast and give a cooperating worker plenty of time
pub fn fast_settings(total_samples: u64) -> SubmissionSettings {
    SubmissionSettings {
        total_samples,
        required_custom_fields: Vec::new(),
        wait: WaitPolicy::new(Duration::from_millis(10), Duration::from_secs(5)),
    }
}

/// Short ceiling for tests that expect a timeout
pub fn timeout_settings(total_samples: u64) -> SubmissionSettings {
    SubmissionSettings {
        total_samples,
        required_custom_fields: Vec::new(),
        wait: WaitPolicy::new(Duration::from_millis(10), Duration::from_millis(200)),
    }
}

/// Temporary store plus a coordinator wired to it
pub struct TestStore {
    pub layout: StoreLayout,
    pub coordinator: FileCoordinator,
    _temp: TempDir,
}

impl TestStore {
    pub async fn new(settings: SubmissionSettings) -> Self {
        let temp = TempDir::new().unwrap();
        let layout = StoreLayout::new(temp.path());
        let coordinator = Coordinator::new(
            FileCursorStore::new(&layout),
            FileArtifactStore::new(layout.clone()),
            settings,
        );
        coordinator.prepare_store().await.unwrap();

        Self {
            layout,
            coordinator,
            _temp: temp,
        }
    }

    pub async fn set_cursor(&self, index: u64) {
        tokio::fs::write(self.layout.cursor_path(), index.to_string())
            .await
            .unwrap();
    }

    pub async fn cursor(&self) -> String {
        tokio::fs::read_to_string(self.layout.cursor_path()).await.unwrap()
    }

    pub fn worker(&self, behavior: WorkerBehavior) -> SimulatedWorker {
        SimulatedWorker::spawn(self.layout.clone(), behavior)
    }
}
