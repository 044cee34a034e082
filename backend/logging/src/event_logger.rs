//! Trigger Event Logger
//!
//! One structured event per command outcome and per served suggestion list.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerEvent {
    CommandExecuted {
        command: String,
        args: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    SuggestionsServed {
        pattern: String,
        query: String,
        count: usize,
    },
    SuggestionsFailed {
        pattern: String,
        error: String,
    },
    TriggerFailed {
        pattern: String,
        error: String,
    },
}

impl TriggerEvent {
    /// Same event with every free-text field scrubbed.
    pub fn redacted(mut self) -> Self {
        match &mut self {
            TriggerEvent::CommandExecuted { args, error, .. } => {
                *args = redact_sensitive_data(args);
                if let Some(error) = error {
                    *error = redact_sensitive_data(error);
                }
            }
            TriggerEvent::SuggestionsServed { query, .. } => {
                *query = redact_sensitive_data(query);
            }
            TriggerEvent::SuggestionsFailed { error, .. } | TriggerEvent::TriggerFailed { error, .. } => {
                *error = redact_sensitive_data(error);
            }
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub event: TriggerEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit `event` under the `trigger_events` target.
    pub fn log_event(agent: &str, event: TriggerEvent) {
        let entry = EventLogEntry {
            agent: agent.into(),
            timestamp: Utc::now(),
            event: event.redacted(),
        };

        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "trigger_events", event = %json, "Trigger event"),
            Err(_) => info!(target: "trigger_events", event = ?entry, "Trigger event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_args_are_redacted() {
        let event = TriggerEvent::CommandExecuted {
            command: "deploy".into(),
            args: "--token abc".into(),
            success: false,
            error: Some("Bearer abc.def rejected".into()),
        }
        .redacted();

        let TriggerEvent::CommandExecuted { args, error, .. } = event else {
            panic!("variant changed");
        };
        assert_eq!(args, "--token [REDACTED]");
        assert_eq!(error.as_deref(), Some("[REDACTED_TOKEN] rejected"));
    }

    #[test]
    fn entries_serialize_with_type_tag() {
        let entry = EventLogEntry {
            agent: "default".into(),
            timestamp: Utc::now(),
            event: TriggerEvent::SuggestionsServed { pattern: "/".into(), query: "he".into(), count: 2 },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["agent"], "default");
        assert_eq!(json["event"]["type"], "suggestions_served");
        assert_eq!(json["event"]["count"], 2);
    }

    #[test]
    fn log_event_does_not_panic_without_subscriber() {
        EventLogger::log_event("a", TriggerEvent::TriggerFailed { pattern: "@".into(), error: "x".into() });
    }
}
