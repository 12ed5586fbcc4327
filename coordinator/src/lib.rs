//! Coordinator library for the file-based generation bridge
//!
//! Accepts generation requests over HTTP, hands each one to an out-of-process
//! worker through a trigger artifact in a shared directory, and blocks until
//! the matching result artifact appears.

pub mod config;
pub mod coordinator_impl;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod web;

// Re-export main types
pub use config::CoordinatorConfig;
pub use coordinator_impl::Coordinator;
pub use error::{CoordinatorError, CoordinatorResult};

// Re-export trait definitions
pub use traits::{ArtifactStore, CursorStore, ResultRead};

// Re-export service implementations
pub use services::{FileArtifactStore, FileCursorStore};
