//! User-facing flows. Each validates locally before touching the network and
//! reports failures with the message a user should see.

pub mod catalog;
pub mod contact;
pub mod course;
pub mod issue;
pub mod login;
pub mod otp;
pub mod payment;
pub mod registration;

use crate::error::{AccessError, ApiError, StorageError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The server answered 2xx but with `success: false`.
    #[error("{0}")]
    Rejected(String),
}

impl FlowError {
    /// True when the request never left the client.
    pub fn is_local(&self) -> bool {
        matches!(self, FlowError::Validation(_) | FlowError::Access(_))
    }

    /// The message to show, or `fallback` when the error carries none.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

/// Whitespace-only input counts as missing.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Server message from a `{success, message}` body, if non-empty.
pub(crate) fn server_message(body: &serde_json::Value) -> Option<String> {
    body.get("message")
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
