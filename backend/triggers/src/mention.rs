/// The `@` trigger: inline mentions resolved against a host-supplied target list.
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::detection::{find_trigger_occurrences, parse_multi_trigger_input};
use crate::registry::{RegistryItem, TriggerRegistry};
use crate::trigger::Trigger;
use crate::types::{ParsedTrigger, SuggestionItem, TriggerContext, TriggerMode, TriggerResult};

pub const MENTION_PATTERN: &str = "@";
pub const DEFAULT_MENTION_PRIORITY: i32 = 5;

/// Something that can be mentioned: a file, a teammate, a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionTarget {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl MentionTarget {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), aliases: Vec::new(), description: description.into() }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    fn to_suggestion(&self) -> SuggestionItem {
        SuggestionItem {
            name: self.name.clone(),
            label: format!("{MENTION_PATTERN}{}", self.name),
            description: self.description.clone(),
            aliases: self.aliases.clone(),
            usage: None,
            examples: Vec::new(),
        }
    }
}

impl RegistryItem for MentionTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

pub struct MentionTrigger {
    targets: Arc<TriggerRegistry<MentionTarget>>,
    priority: i32,
}

impl MentionTrigger {
    pub fn new(targets: Arc<TriggerRegistry<MentionTarget>>) -> Self {
        Self { targets, priority: DEFAULT_MENTION_PRIORITY }
    }

    pub fn from_targets(targets: impl IntoIterator<Item = MentionTarget>) -> Self {
        let mut registry = TriggerRegistry::new();
        for target in targets {
            registry.register(target);
        }
        Self::new(Arc::new(registry))
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl Trigger for MentionTrigger {
    fn pattern(&self) -> &str {
        MENTION_PATTERN
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn mode(&self) -> TriggerMode {
        TriggerMode::Inline
    }

    /// The mention being typed is the last one in the input.
    fn parse(&self, input: &str) -> ParsedTrigger {
        let identifier = find_trigger_occurrences(input, MENTION_PATTERN)
            .pop()
            .map(|occurrence| occurrence.identifier)
            .unwrap_or_default();
        ParsedTrigger {
            trigger_char: MENTION_PATTERN.to_string(),
            command: identifier.clone(),
            args: String::new(),
            query: identifier,
        }
    }

    /// Closed once anything follows the last mention's identifier.
    fn closes_suggestions(&self, input: &str) -> bool {
        find_trigger_occurrences(input, MENTION_PATTERN)
            .last()
            .is_none_or(|occurrence| occurrence.end_index < input.len())
    }

    async fn suggestions(&self, input: &str) -> Result<Vec<SuggestionItem>> {
        let query = self.parse(input).query;
        Ok(self.targets.search(&query).iter().map(|target| target.to_suggestion()).collect())
    }

    async fn execute(&self, ctx: &TriggerContext) -> Result<TriggerResult> {
        let parsed = parse_multi_trigger_input(&ctx.raw_input, MENTION_PATTERN);

        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for occurrence in &parsed.occurrences {
            match self.targets.get(&occurrence.identifier) {
                Some(target) => resolved.push(target.as_ref().clone()),
                None => unresolved.push(occurrence.identifier.clone()),
            }
        }
        debug!(
            "[Mentions] {} resolved, {} unresolved",
            resolved.len(),
            unresolved.len()
        );

        ctx.chat.send_message(&ctx.raw_input).await?;

        Ok(TriggerResult::succeeded().with_data(json!({
            "occurrences": parsed.occurrences,
            "cleanedInput": parsed.cleaned_input,
            "resolved": resolved,
            "unresolved": unresolved,
        })))
    }
}
