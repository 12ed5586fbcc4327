//! HTTP surface of the coordinator

pub mod handlers;
