// # Callback Context
//
// The tri-modal callback a bridge action reports through: zero or more
// `progress` calls, then at most one of `success` or `error`.
//
// ## Streaming Contract
//
// Streaming actions (see `Action::is_streaming`) NEVER call `success`.
// They keep the callback alive and deliver every update through `progress`
// for as long as the bridge connection exists. Callers must not wait for
// `success` from such an action.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Error payload delivered through [`CallbackContext::error`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackError {
    /// Human-readable description, prefixed with the failing action
    pub message: String,
    /// The underlying failure
    pub cause: String,
}

impl CallbackError {
    pub fn new(message: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self {
            message: message.into(),
            cause: cause.to_string(),
        }
    }
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.cause)
    }
}

impl std::error::Error for CallbackError {}

/// Receiver for the outcome of a bridge action
///
/// Implementations must be cheap and non-blocking; they are invoked from
/// inside reconciliation and must not call back into the reconciler while
/// holding their own locks.
pub trait CallbackContext: Send + Sync {
    /// Intermediate (or, for streaming actions, every) result
    fn progress(&self, data: Value);

    /// Terminal success. Never called by streaming actions.
    fn success(&self, data: Option<Value>);

    /// Terminal failure
    fn error(&self, error: CallbackError);
}
