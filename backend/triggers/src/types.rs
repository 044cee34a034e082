/// Shared trigger types.
///
/// Everything a host needs to talk to the engine: parse results, occurrence
/// spans, execution context and the generic result envelope.
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Where a trigger pattern may appear in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Only at the very start of the input (commands).
    #[default]
    Positional,
    /// Anywhere in the input (mentions).
    Inline,
}

// ---------------------------------------------------------------------------
// Parse results
// ---------------------------------------------------------------------------

/// Single-trigger parse of the input, e.g. `/hello world`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTrigger {
    pub trigger_char: String,
    /// First space-delimited token after the pattern.
    pub command: String,
    /// Everything after the first space.
    pub args: String,
    /// Suggestion filter; same as `command`.
    pub query: String,
}

/// One match of an inline pattern. Indices are byte offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerOccurrence {
    pub pattern: String,
    pub start_index: usize,
    pub end_index: usize,
    pub content: String,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiTriggerParseResult {
    pub original_input: String,
    pub occurrences: Vec<TriggerOccurrence>,
    /// Input with every occurrence span removed and whitespace collapsed.
    pub cleaned_input: String,
    pub has_triggers: bool,
}

// ---------------------------------------------------------------------------
// Chat handle
// ---------------------------------------------------------------------------

/// Send-readiness of the chat transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Ready,
    Submitted,
    Streaming,
    Error,
}

/// The host's chat/session handle. Passed through to actions untouched.
#[async_trait]
pub trait ChatHandle: Send + Sync {
    /// Send a user-authored message.
    async fn send_message(&self, text: &str) -> Result<()>;

    fn status(&self) -> ChatStatus;
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Context handed to a trigger when the host submits the input.
#[derive(Clone)]
pub struct TriggerContext {
    pub chat: Arc<dyn ChatHandle>,
    pub raw_input: String,
    pub trigger_char: String,
    pub metadata: Map<String, Value>,
}

impl TriggerContext {
    pub fn new(
        chat: Arc<dyn ChatHandle>,
        raw_input: impl Into<String>,
        trigger_char: impl Into<String>,
    ) -> Self {
        Self {
            chat,
            raw_input: raw_input.into(),
            trigger_char: trigger_char.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Agent id recorded in the metadata, if any.
    pub fn agent(&self) -> Option<&str> {
        self.metadata.get("agent").and_then(Value::as_str)
    }
}

impl fmt::Debug for TriggerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerContext")
            .field("raw_input", &self.raw_input)
            .field("trigger_char", &self.trigger_char)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Envelope returned by the manager whichever trigger fired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResult {
    pub was_triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl TriggerResult {
    pub fn not_triggered() -> Self {
        Self::default()
    }

    pub fn succeeded() -> Self {
        Self { was_triggered: true, success: Some(true), ..Default::default() }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            was_triggered: true,
            success: Some(false),
            error: Some(error.into()),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

/// One entry of a suggestion list, already flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionItem {
    pub name: String,
    /// Text to put in the input when the item is picked (e.g. `/hello`).
    pub label: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl SuggestionItem {
    pub fn completion(&self) -> &str {
        &self.label
    }
}
