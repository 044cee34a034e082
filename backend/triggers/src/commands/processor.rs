/// Command processor: resolve, validate and run one slash command.
///
/// The registry is built lazily per agent. Switching agents drops the old
/// registry; concurrent callers for the same agent share one load.
use std::sync::{Arc, Mutex, MutexGuard};

use chatline_logging::{EventLogger, TriggerEvent};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::args::parse_command_args;
use crate::commands::builtin::builtin_commands;
use crate::commands::registry::CommandRegistry;
use crate::commands::types::{AgentCommands, CommandContext, CommandExecuteResult, SlashCommand};
use crate::error::{TriggerError, guarded};
use crate::types::ChatHandle;

pub const COMMAND_PATTERN: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorSettings {
    /// Reject options the command does not declare.
    pub strict_options: bool,
    /// Treat `//` and `/*` as text rather than commands.
    pub comment_guard: bool,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self { strict_options: true, comment_guard: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Whether `input` should be handled as a slash command at all.
pub fn is_slash_command(input: &str, comment_guard: bool) -> bool {
    input.starts_with(COMMAND_PATTERN) && !(comment_guard && (input.starts_with("//") || input.starts_with("/*")))
}

struct AgentSlot {
    agent: String,
    registry: Arc<OnceCell<Arc<CommandRegistry>>>,
}

pub struct CommandProcessor {
    settings: ProcessorSettings,
    builtins: Vec<SlashCommand>,
    slot: Mutex<Option<AgentSlot>>,
}

impl Default for CommandProcessor {
    fn default() -> Self {
        Self::new(ProcessorSettings::default())
    }
}

impl CommandProcessor {
    pub fn new(settings: ProcessorSettings) -> Self {
        Self { settings, builtins: builtin_commands(), slot: Mutex::new(None) }
    }

    pub fn settings(&self) -> ProcessorSettings {
        self.settings
    }

    pub fn state(&self) -> ProcessorState {
        match self.slot().as_ref() {
            None => ProcessorState::Uninitialized,
            Some(slot) if slot.registry.initialized() => ProcessorState::Ready,
            Some(_) => ProcessorState::Initializing,
        }
    }

    /// Agent the current registry belongs to.
    pub fn active_agent(&self) -> Option<String> {
        self.slot().as_ref().map(|slot| slot.agent.clone())
    }

    fn slot(&self) -> MutexGuard<'_, Option<AgentSlot>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registry for `agent`, loading it on first use or after an agent switch.
    pub async fn ensure_ready(&self, agent: &str, agent_commands: &AgentCommands) -> Arc<CommandRegistry> {
        let cell = {
            let mut slot = self.slot();
            let current = slot
                .as_ref()
                .filter(|current| current.agent == agent)
                .map(|current| current.registry.clone());
            match current {
                Some(cell) => cell,
                None => {
                    if let Some(previous) = slot.as_ref() {
                        info!("[Commands] Agent changed from '{}' to '{}'", previous.agent, agent);
                    }
                    let cell = Arc::new(OnceCell::new());
                    *slot = Some(AgentSlot { agent: agent.to_string(), registry: cell.clone() });
                    cell
                }
            }
        };

        cell.get_or_init(|| async { Arc::new(CommandRegistry::load(agent, &self.builtins, agent_commands)) })
            .await
            .clone()
    }

    pub async fn execute(
        &self,
        raw_input: &str,
        chat: Arc<dyn ChatHandle>,
        agent: &str,
        agent_commands: &AgentCommands,
    ) -> CommandExecuteResult {
        self.execute_with_metadata(raw_input, chat, Map::new(), agent, agent_commands).await
    }

    /// As [`execute`](Self::execute), forwarding host metadata to the action.
    /// `agent` is always recorded under the `agent` key.
    pub async fn execute_with_metadata(
        &self,
        raw_input: &str,
        chat: Arc<dyn ChatHandle>,
        mut metadata: Map<String, Value>,
        agent: &str,
        agent_commands: &AgentCommands,
    ) -> CommandExecuteResult {
        let registry = self.ensure_ready(agent, agent_commands).await;

        if !is_slash_command(raw_input, self.settings.comment_guard) {
            return CommandExecuteResult::not_command();
        }

        let body = &raw_input[COMMAND_PATTERN.len()..];
        let (command_name, args_string) = body.split_once(' ').unwrap_or((body, ""));

        if command_name.is_empty() {
            return CommandExecuteResult::failed(TriggerError::CommandFormat.to_string());
        }

        let Some(command) = registry.get(command_name) else {
            debug!("[Commands] Unknown command /{}", command_name);
            let result = CommandExecuteResult::failed(TriggerError::UnknownCommand(command_name.to_string()).to_string())
                .for_command(command_name);
            record(agent, command_name, args_string, &result);
            return result;
        };

        let args = match parse_command_args(args_string, command.options.as_ref(), self.settings.strict_options) {
            Ok(args) => args,
            Err(err) => {
                let result = CommandExecuteResult::failed(TriggerError::from(err).to_string()).with_help(&command);
                record(agent, &command.name, args_string, &result);
                return result;
            }
        };

        metadata.insert("agent".into(), Value::String(agent.to_string()));
        let ctx = CommandContext {
            chat,
            raw_input: raw_input.to_string(),
            trigger_char: COMMAND_PATTERN.to_string(),
            metadata,
            command_name: command.name.clone(),
            args,
            args_string: args_string.to_string(),
            agent: agent.to_string(),
        };

        info!("[Commands] Running /{} for agent '{}'", command.name, agent);
        let result = match guarded(command.action.run(&ctx)).await {
            Ok(()) => CommandExecuteResult::succeeded(command.name.as_str()),
            Err(message) => {
                warn!("[Commands] /{} failed: {}", command_name, message);
                CommandExecuteResult::failed(
                    TriggerError::ActionExecution { command: command_name.to_string(), message }.to_string(),
                )
                .for_command(command.name.as_str())
            }
        };
        record(agent, &command.name, args_string, &result);
        result
    }

    pub async fn get_commands(&self, agent: &str, agent_commands: &AgentCommands) -> Vec<Arc<SlashCommand>> {
        self.ensure_ready(agent, agent_commands).await.all()
    }

    /// Search by name, alias or description.
    pub async fn find_commands(
        &self,
        query: &str,
        agent: &str,
        agent_commands: &AgentCommands,
    ) -> Vec<Arc<SlashCommand>> {
        self.ensure_ready(agent, agent_commands).await.search(query)
    }
}

fn record(agent: &str, command: &str, args: &str, result: &CommandExecuteResult) {
    EventLogger::log_event(
        agent,
        TriggerEvent::CommandExecuted {
            command: command.to_string(),
            args: args.to_string(),
            success: result.is_success(),
            error: result.error.clone(),
        },
    );
}
