//! Request handlers

pub mod api;

pub use api::{generate_next, health_check};
