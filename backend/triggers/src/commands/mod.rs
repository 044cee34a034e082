//! Slash commands: definitions, the agent-scoped registry, the processor that
//! runs them and the `/` trigger that exposes them.

pub mod builtin;
pub mod processor;
pub mod registry;
pub mod trigger;
pub mod types;

pub use builtin::{builtin_commands, hello_command};
pub use processor::{COMMAND_PATTERN, CommandProcessor, ProcessorSettings, ProcessorState, is_slash_command};
pub use registry::CommandRegistry;
pub use trigger::{CommandTrigger, DEFAULT_COMMAND_PRIORITY};
pub use types::{AgentCommands, CommandAction, CommandContext, CommandExecuteResult, FnAction, SlashCommand, action_fn};
