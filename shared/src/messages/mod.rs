//! Artifact payloads exchanged through the shared store
//!
//! The trigger and result artifacts are the only messages that cross the
//! coordinator/worker boundary.

pub mod job;

pub use job::{JobDescriptor, ResultPayload};
