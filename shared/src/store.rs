//! Shared store directory layout
//!
//! File names are fixed: the worker on the other side locates artifacts by
//! these exact names.

use std::path::{Path, PathBuf};

use crate::types::JobIndex;

pub const CURSOR_FILE: &str = "current_index.txt";
pub const TRIGGER_FILE: &str = "trigger.txt";
pub const TRIGGER_TMP_FILE: &str = "trigger.txt.tmp";
pub const SHUTDOWN_FILE: &str = "shutdown_worker.signal";

/// Default store location, relative to the working directory
pub const DEFAULT_STORE_DIR: &str = "./gradio_results";

/// Paths of every artifact inside one store directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cursor_path(&self) -> PathBuf {
        self.root.join(CURSOR_FILE)
    }

    pub fn trigger_path(&self) -> PathBuf {
        self.root.join(TRIGGER_FILE)
    }

    /// Staging path for the trigger; lives in the same directory so the
    /// final rename never crosses a filesystem boundary
    pub fn trigger_tmp_path(&self) -> PathBuf {
        self.root.join(TRIGGER_TMP_FILE)
    }

    pub fn result_path(&self, index: JobIndex) -> PathBuf {
        self.root.join(index.result_file_name())
    }

    pub fn shutdown_path(&self) -> PathBuf {
        self.root.join(SHUTDOWN_FILE)
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_DIR)
    }
}
