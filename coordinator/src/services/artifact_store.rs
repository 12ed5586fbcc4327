//! File-backed artifact store
//!
//! Handles the trigger, result and shutdown artifacts of one shared store
//! directory. The trigger is published with write-temp-then-rename so the
//! worker only ever observes a complete descriptor at the canonical path.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use shared::{JobDescriptor, JobIndex, ProcessId, ResultPayload, StoreLayout, process_debug, process_warn};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::traits::{ArtifactStore, ResultRead};

/// Content of the shutdown marker; only its presence matters
const SHUTDOWN_CONTENT: &str = "shutdown";

/// Artifact store over a real directory
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    layout: StoreLayout,
}

impl FileArtifactStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    /// Remove a file, reporting whether it was there
    async fn remove_if_present(path: &Path, operation: &str) -> CoordinatorResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CoordinatorError::store(operation, path, e)),
        }
    }

    async fn write_staged(path: &Path, content: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn prepare(&self) -> CoordinatorResult<()> {
        let root = self.layout.root();
        fs::create_dir_all(root)
            .await
            .map_err(|e| CoordinatorError::store("create store directory", root, e))?;

        process_debug!(ProcessId::current(), "📁 Store directory ready: {}", root.display());
        Ok(())
    }

    async fn publish_trigger(&self, descriptor: &JobDescriptor) -> CoordinatorResult<()> {
        let content = descriptor.to_pretty_json()?;
        let tmp_path = self.layout.trigger_tmp_path();
        let trigger_path = self.layout.trigger_path();

        if let Err(e) = Self::write_staged(&tmp_path, content.as_bytes()).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(CoordinatorError::store("write staged trigger", &tmp_path, e));
        }

        if let Err(e) = fs::rename(&tmp_path, &trigger_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(CoordinatorError::store("publish trigger", &trigger_path, e));
        }

        process_debug!(
            ProcessId::current(),
            "📝 Published trigger for job {}: {}",
            descriptor.index,
            trigger_path.display()
        );
        Ok(())
    }

    async fn trigger_exists(&self) -> bool {
        fs::try_exists(self.layout.trigger_path()).await.unwrap_or(false)
    }

    async fn remove_trigger(&self) -> CoordinatorResult<bool> {
        Self::remove_if_present(&self.layout.trigger_path(), "remove trigger").await
    }

    async fn read_result(&self, index: JobIndex) -> ResultRead {
        let path = self.layout.result_path(index);

        match fs::read(&path).await {
            Ok(content) => match ResultPayload::parse(&content) {
                Ok(payload) => ResultRead::Ready(payload),
                Err(e) => ResultRead::Corrupt(e.to_string()),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => ResultRead::Missing,
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Failed to read {}: {}", path.display(), e);
                ResultRead::Corrupt(e.to_string())
            }
        }
    }

    async fn remove_result(&self, index: JobIndex) -> CoordinatorResult<bool> {
        Self::remove_if_present(&self.layout.result_path(index), "remove result").await
    }

    async fn write_shutdown_marker(&self) -> CoordinatorResult<()> {
        let path = self.layout.shutdown_path();
        fs::write(&path, SHUTDOWN_CONTENT)
            .await
            .map_err(|e| CoordinatorError::store("write shutdown marker", &path, e))
    }

    async fn clear_shutdown_marker(&self) -> CoordinatorResult<bool> {
        Self::remove_if_present(&self.layout.shutdown_path(), "remove shutdown marker").await
    }

    async fn is_writable(&self) -> bool {
        let root = self.layout.root();
        match fs::metadata(root).await {
            Ok(metadata) if metadata.is_dir() => has_write_access(root),
            _ => false,
        }
    }
}

#[cfg(unix)]
fn has_write_access(path: &Path) -> bool {
    use nix::unistd::{AccessFlags, access};
    access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn has_write_access(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|metadata| !metadata.permissions().readonly())
        .unwrap_or(false)
}
