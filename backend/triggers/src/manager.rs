/// Trigger manager: priority-ordered routing of input to registered triggers.
use std::sync::Arc;

use chatline_logging::{EventLogger, TriggerEvent};
use tracing::{debug, info, warn};

use crate::detection::parse_multi_trigger_input;
use crate::error::{TriggerError, guarded};
use crate::trigger::Trigger;
use crate::types::{MultiTriggerParseResult, TriggerContext, TriggerResult};

/// Holds triggers sorted by descending priority. Equal priorities keep
/// registration order (the sort is stable), so the earlier one wins.
#[derive(Default, Clone)]
pub struct TriggerManager {
    triggers: Vec<Arc<dyn Trigger>>,
}

impl TriggerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, trigger: Arc<dyn Trigger>) {
        debug!(
            "[Triggers] Registering '{}' (priority {}, {:?})",
            trigger.pattern(),
            trigger.priority(),
            trigger.mode()
        );
        self.triggers.push(trigger);
        self.triggers.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// First matching trigger in priority order. Blank input never matches.
    pub fn detect_trigger(&self, input: &str) -> Option<Arc<dyn Trigger>> {
        if input.trim().is_empty() {
            return None;
        }
        self.triggers.iter().find(|t| t.matches(input)).cloned()
    }

    /// Every matching trigger, in priority order.
    pub fn detect_all_triggers(&self, input: &str) -> Vec<Arc<dyn Trigger>> {
        if input.trim().is_empty() {
            return Vec::new();
        }
        self.triggers.iter().filter(|t| t.matches(input)).cloned().collect()
    }

    /// Extract inline occurrences of `pattern`, e.g. `@mentions`.
    pub fn parse_inline_triggers(&self, input: &str, pattern: &str) -> MultiTriggerParseResult {
        parse_multi_trigger_input(input, pattern)
    }

    /// Run the detected trigger. Errors and panics come back as a failed
    /// result; nothing propagates to the caller.
    pub async fn execute(&self, input: &str, ctx: &TriggerContext) -> TriggerResult {
        let Some(trigger) = self.detect_trigger(input) else {
            return TriggerResult::not_triggered();
        };

        info!("[Triggers] Executing '{}' trigger", trigger.pattern());
        match guarded(trigger.execute(ctx)).await {
            Ok(result) => result,
            Err(message) => {
                warn!("[Triggers] '{}' trigger failed: {}", trigger.pattern(), message);
                EventLogger::log_event(
                    ctx.agent().unwrap_or_default(),
                    TriggerEvent::TriggerFailed { pattern: trigger.pattern().to_string(), error: message.clone() },
                );
                TriggerResult::failed(TriggerError::Dispatch(message).to_string())
            }
        }
    }

    pub fn triggers(&self) -> &[Arc<dyn Trigger>] {
        &self.triggers
    }

    pub fn trigger_by_pattern(&self, pattern: &str) -> Option<Arc<dyn Trigger>> {
        self.triggers.iter().find(|t| t.pattern() == pattern).cloned()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}
