/// Failure taxonomy. Display strings are the messages shown to the user.
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use thiserror::Error;

use crate::args::ArgError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    /// `/` with no command token.
    #[error("Invalid command format")]
    CommandFormat,

    #[error("Unknown command: /{0}")]
    UnknownCommand(String),

    #[error(transparent)]
    ArgumentValidation(#[from] ArgError),

    #[error("Command /{command} failed: {message}")]
    ActionExecution { command: String, message: String },

    /// The cause is kept for logs; the user only sees the generic message.
    #[error("Failed to load suggestions")]
    SuggestionFetch(String),

    #[error("Trigger execution failed: {0}")]
    Dispatch(String),
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

/// Await `future`, turning both an `Err` and a panic into its message.
pub(crate) async fn guarded<T>(future: impl Future<Output = anyhow::Result<T>>) -> Result<T, String> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(panic_message(payload)),
    }
}
