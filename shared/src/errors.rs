//! Shared error types for the generation bridge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid job index: {value}")]
    InvalidJobIndex { value: i64 },

    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },

    #[error("Result artifact is not a JSON object")]
    ResultNotObject,
}

pub type SharedResult<T> = Result<T, SharedError>;
