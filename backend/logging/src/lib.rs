//! Structured logging for chatline.
//!
//! Subscriber setup, structured trigger events and secret redaction.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, TriggerEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
