//! Core rendezvous logic
//!
//! Pure protocol decisions over the store traits: how a job is submitted,
//! how its result is awaited, and when the cursor moves.

pub mod awaiting;
pub mod submission;

pub use awaiting::{AwaitOutcome, ResultAwaiter, WaitPolicy};
pub use submission::{GenerateRequest, JobOutcome, SubmissionEngine, SubmissionSettings, SubmitError};
