//! Service implementations
//!
//! Real implementations of the store traits for production use

pub mod artifact_store;
pub mod cursor_store;
pub mod shutdown;

#[cfg(test)]
mod tests;

// Re-export service implementations
pub use artifact_store::FileArtifactStore;
pub use cursor_store::FileCursorStore;
pub use shutdown::{ShutdownCoordinator, wait_for_signal};
