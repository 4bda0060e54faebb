//! Transformation error types.

use thiserror::Error;

use crate::decoding::domain::DomainDecodeError;
use crate::decoding::uint256::AmountDecodeError;

#[derive(Debug, Error)]
pub enum TransformationError {
    #[error("Handler '{handler_name}' failed: {message}")]
    HandlerError {
        handler_name: String,
        message: String,
    },

    #[error("Handler '{handler}': event has no key at index {index}")]
    MissingKey { handler: &'static str, index: usize },

    #[error("Handler '{handler}': event has no data field at index {index}")]
    MissingData { handler: &'static str, index: usize },

    #[error("Amount decode error: {0}")]
    AmountDecode(#[from] AmountDecodeError),

    #[error("Domain decode error: {0}")]
    DomainDecode(#[from] DomainDecodeError),

    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransformationError {
    /// Create a handler error with context.
    pub fn handler(name: &str, message: impl Into<String>) -> Self {
        Self::HandlerError {
            handler_name: name.to_string(),
            message: message.into(),
        }
    }
}
