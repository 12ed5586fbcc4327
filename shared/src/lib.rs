//! Shared protocol types for the generation bridge
//!
//! Contains everything both sides of the filesystem rendezvous need to agree on:
//! how jobs are addressed, what the trigger and result artifacts look like, and
//! where they live inside the shared store directory.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod store;
pub mod types;

pub use errors::*;
pub use types::*;

pub use messages::{JobDescriptor, ResultPayload};
pub use store::StoreLayout;
