//! File-backed cursor store
//!
//! The cursor is a plain text integer. Writes go through a sibling temp file
//! and a rename so a crash mid-write never leaves a truncated cursor behind.

use std::path::PathBuf;

use async_trait::async_trait;
use shared::{ProcessId, StoreLayout, process_debug, process_warn};
use tokio::fs;

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::traits::CursorStore;

/// Cursor persisted as `current_index.txt` inside the store
#[derive(Debug, Clone)]
pub struct FileCursorStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileCursorStore {
    pub fn new(layout: &StoreLayout) -> Self {
        let path = layout.cursor_path();
        let tmp_path = path.with_extension("txt.tmp");
        Self { path, tmp_path }
    }
}

#[async_trait]
impl CursorStore for FileCursorStore {
    async fn initialize(&self) -> CoordinatorResult<()> {
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::write(&self.path, "0")
            .await
            .map_err(|e| CoordinatorError::store("create cursor", &self.path, e))?;

        process_debug!(ProcessId::current(), "📁 Created cursor file: {}", self.path.display());
        Ok(())
    }

    async fn read(&self) -> u64 {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                process_debug!(ProcessId::current(), "Cursor unreadable ({}), starting from 0", e);
                return 0;
            }
        };

        match content.trim().parse::<u64>() {
            Ok(index) => index,
            Err(_) => {
                process_warn!(
                    ProcessId::current(),
                    "⚠️ Cursor file holds '{}', treating as 0",
                    content.trim()
                );
                0
            }
        }
    }

    async fn write(&self, index: u64) -> CoordinatorResult<()> {
        fs::write(&self.tmp_path, index.to_string())
            .await
            .map_err(|e| CoordinatorError::store("write cursor", &self.tmp_path, e))?;

        fs::rename(&self.tmp_path, &self.path)
            .await
            .map_err(|e| CoordinatorError::store("replace cursor", &self.path, e))?;

        process_debug!(ProcessId::current(), "💾 Cursor set to {}", index);
        Ok(())
    }
}
