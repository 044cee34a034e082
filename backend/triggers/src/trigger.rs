/// The trigger seam: one implementation per pattern (`/`, `@`, ...).
use anyhow::Result;
use async_trait::async_trait;

use crate::detection::{matches_trigger_pattern, parse_input};
use crate::types::{ParsedTrigger, SuggestionItem, TriggerContext, TriggerMode, TriggerResult};

#[async_trait]
pub trait Trigger: Send + Sync {
    /// Text that activates this trigger, e.g. `/`.
    fn pattern(&self) -> &str;

    /// Higher is checked first.
    fn priority(&self) -> i32;

    fn mode(&self) -> TriggerMode {
        TriggerMode::Positional
    }

    fn matches(&self, input: &str) -> bool {
        matches_trigger_pattern(input, self.pattern(), self.mode())
    }

    fn parse(&self, input: &str) -> ParsedTrigger {
        parse_input(input, self.pattern())
    }

    /// Whether a suggestion list for `input` should be closed even though the
    /// trigger still matches.
    fn closes_suggestions(&self, _input: &str) -> bool {
        false
    }

    async fn suggestions(&self, input: &str) -> Result<Vec<SuggestionItem>>;

    async fn execute(&self, ctx: &TriggerContext) -> Result<TriggerResult>;
}
