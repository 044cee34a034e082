/// The `/` trigger: positional, highest default priority, backed by the
/// command processor.
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::commands::processor::{COMMAND_PATTERN, CommandProcessor};
use crate::commands::types::{AgentCommands, CommandExecuteResult};
use crate::trigger::Trigger;
use crate::types::{SuggestionItem, TriggerContext, TriggerMode, TriggerResult};

pub const DEFAULT_COMMAND_PRIORITY: i32 = 10;

pub struct CommandTrigger {
    processor: Arc<CommandProcessor>,
    agent: String,
    agent_commands: Arc<AgentCommands>,
    priority: i32,
}

impl CommandTrigger {
    pub fn new(processor: Arc<CommandProcessor>, agent: impl Into<String>, agent_commands: Arc<AgentCommands>) -> Self {
        Self {
            processor,
            agent: agent.into(),
            agent_commands,
            priority: DEFAULT_COMMAND_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn processor(&self) -> &Arc<CommandProcessor> {
        &self.processor
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }
}

#[async_trait]
impl Trigger for CommandTrigger {
    fn pattern(&self) -> &str {
        COMMAND_PATTERN
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn mode(&self) -> TriggerMode {
        TriggerMode::Positional
    }

    /// The list closes as soon as arguments are being typed.
    fn closes_suggestions(&self, input: &str) -> bool {
        input
            .strip_prefix(COMMAND_PATTERN)
            .is_some_and(|rest| rest.contains(' '))
    }

    async fn suggestions(&self, input: &str) -> Result<Vec<SuggestionItem>> {
        let parsed = self.parse(input);
        let commands = if parsed.command.is_empty() {
            self.processor.get_commands(&self.agent, &self.agent_commands).await
        } else {
            self.processor
                .find_commands(&parsed.command, &self.agent, &self.agent_commands)
                .await
        };
        Ok(commands.iter().map(|command| command.to_suggestion()).collect())
    }

    /// Always runs as the trigger's own agent; the commands it holds belong
    /// to that agent only.
    async fn execute(&self, ctx: &TriggerContext) -> Result<TriggerResult> {
        if let Some(requested) = ctx.agent().filter(|requested| *requested != self.agent) {
            debug!("[Commands] Ignoring context agent '{}'; trigger serves '{}'", requested, self.agent);
        }
        let result = self
            .processor
            .execute_with_metadata(
                &ctx.raw_input,
                ctx.chat.clone(),
                ctx.metadata.clone(),
                &self.agent,
                &self.agent_commands,
            )
            .await;
        Ok(to_trigger_result(result))
    }
}

/// Flatten help fields into `data` so the host needs no second lookup.
fn to_trigger_result(result: CommandExecuteResult) -> TriggerResult {
    let mut data = Map::new();
    if let Some(usage) = result.usage {
        data.insert("usage".into(), Value::String(usage));
    }
    if !result.examples.is_empty() {
        data.insert("examples".into(), Value::from(result.examples));
    }
    if let Some(name) = result.command_name {
        data.insert("commandName".into(), Value::String(name));
    }

    TriggerResult {
        was_triggered: result.was_command,
        success: result.success,
        error: result.error,
        data: (!data.is_empty()).then_some(Value::Object(data)),
    }
}
