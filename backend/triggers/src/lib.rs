pub mod args;
pub mod commands;
pub mod detection;
pub mod error;
pub mod manager;
pub mod mention;
pub mod registry;
pub mod suggest;
pub mod trigger;
pub mod types;

use std::sync::Arc;

pub use args::{ArgError, ArgValue, CommandArgs, NamedArgs, OptionSchema, OptionSpec, OptionType, parse_command_args, tokenize_args};
pub use commands::{
    AgentCommands, CommandAction, CommandContext, CommandExecuteResult, CommandProcessor, CommandTrigger,
    ProcessorSettings, SlashCommand, action_fn,
};
pub use detection::{
    find_trigger_occurrences, find_trigger_occurrences_with_args, fuzzy_score, parse_multi_trigger_input,
    parse_multi_trigger_input_with_args,
};
pub use error::TriggerError;
pub use manager::TriggerManager;
pub use mention::{MentionTarget, MentionTrigger};
pub use registry::{RegistryItem, TriggerRegistry};
pub use suggest::{SuggestionSession, SuggestionState, SuggestionTicket};
pub use trigger::Trigger;
pub use types::{
    ChatHandle, ChatStatus, MultiTriggerParseResult, ParsedTrigger, SuggestionItem, TriggerContext, TriggerMode,
    TriggerOccurrence, TriggerResult,
};

/// What to wire into a fresh manager.
#[derive(Debug, Clone)]
pub struct TriggerManagerConfig {
    pub agent: String,
    pub agent_commands: AgentCommands,
    pub command_priority: i32,
    pub processor: ProcessorSettings,
    /// `None` leaves the `@` trigger out.
    pub mentions: Option<Vec<MentionTarget>>,
    pub mention_priority: i32,
}

impl Default for TriggerManagerConfig {
    fn default() -> Self {
        Self {
            agent: "default".to_string(),
            agent_commands: AgentCommands::new(),
            command_priority: commands::DEFAULT_COMMAND_PRIORITY,
            processor: ProcessorSettings::default(),
            mentions: None,
            mention_priority: mention::DEFAULT_MENTION_PRIORITY,
        }
    }
}

/// Build a manager pre-wired with the `/` trigger and, when configured, `@`.
pub fn create_trigger_manager(config: TriggerManagerConfig) -> TriggerManager {
    let mut manager = TriggerManager::new();

    let processor = Arc::new(CommandProcessor::new(config.processor));
    let commands = CommandTrigger::new(processor, config.agent, Arc::new(config.agent_commands))
        .with_priority(config.command_priority);
    manager.register(Arc::new(commands));

    if let Some(targets) = config.mentions {
        let mentions = MentionTrigger::from_targets(targets).with_priority(config.mention_priority);
        manager.register(Arc::new(mentions));
    }

    manager
}
