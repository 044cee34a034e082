/// Slash command definitions and the values flowing through their execution.
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::args::{CommandArgs, OptionSchema};
use crate::registry::RegistryItem;
use crate::types::{ChatHandle, SuggestionItem};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What a command does when submitted. Errors and panics are caught by the
/// processor and reported as `Command /<name> failed: ...`.
#[async_trait]
pub trait CommandAction: Send + Sync {
    async fn run(&self, ctx: &CommandContext) -> Result<()>;
}

/// Adapter for plain async closures, see [`action_fn`].
pub struct FnAction<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

#[async_trait]
impl<F, Fut> CommandAction for FnAction<F, Fut>
where
    F: Fn(CommandContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn run(&self, ctx: &CommandContext) -> Result<()> {
        (self.f)(ctx.clone()).await
    }
}

/// Wrap an async closure taking an owned context as a command action.
pub fn action_fn<F, Fut>(f: F) -> Arc<dyn CommandAction>
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnAction { f, _fut: PhantomData })
}

// ---------------------------------------------------------------------------
// SlashCommand
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SlashCommand {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub usage: Option<String>,
    pub examples: Vec<String>,
    /// Declared options. `None` means arguments are passed as plain tokens.
    pub options: Option<OptionSchema>,
    pub action: Arc<dyn CommandAction>,
}

impl SlashCommand {
    pub fn new(name: impl Into<String>, description: impl Into<String>, action: Arc<dyn CommandAction>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: description.into(),
            usage: None,
            examples: Vec::new(),
            options: None,
            action,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn options(mut self, options: OptionSchema) -> Self {
        self.options = Some(options);
        self
    }

    /// A registrable command has a non-empty name with no whitespace.
    pub fn is_well_formed(&self) -> bool {
        !self.name.is_empty() && !self.name.chars().any(char::is_whitespace)
    }

    /// Suggestion entry; the completion is `/name`.
    pub fn to_suggestion(&self) -> SuggestionItem {
        SuggestionItem {
            name: self.name.clone(),
            label: format!("/{}", self.name),
            description: self.description.clone(),
            aliases: self.aliases.clone(),
            usage: self.usage.clone(),
            examples: self.examples.clone(),
        }
    }
}

impl RegistryItem for SlashCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl fmt::Debug for SlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommand")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("usage", &self.usage)
            .field("options", &self.options.as_ref().map(|o| o.keys().collect::<Vec<_>>()))
            .finish_non_exhaustive()
    }
}

/// Agent-supplied commands, keyed by export name.
pub type AgentCommands = IndexMap<String, SlashCommand>;

// ---------------------------------------------------------------------------
// Context & result
// ---------------------------------------------------------------------------

/// Everything an action sees.
#[derive(Clone)]
pub struct CommandContext {
    pub chat: Arc<dyn ChatHandle>,
    pub raw_input: String,
    pub trigger_char: String,
    pub metadata: Map<String, Value>,
    /// Canonical command name, even when invoked through an alias.
    pub command_name: String,
    pub args: CommandArgs,
    /// Unparsed text after the command name.
    pub args_string: String,
    pub agent: String,
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("command_name", &self.command_name)
            .field("args", &self.args)
            .field("args_string", &self.args_string)
            .field("agent", &self.agent)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandExecuteResult {
    pub was_command: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_name: Option<String>,
}

impl CommandExecuteResult {
    pub fn not_command() -> Self {
        Self::default()
    }

    pub fn succeeded(command_name: impl Into<String>) -> Self {
        Self {
            was_command: true,
            success: Some(true),
            command_name: Some(command_name.into()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            was_command: true,
            success: Some(false),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn for_command(mut self, command_name: impl Into<String>) -> Self {
        self.command_name = Some(command_name.into());
        self
    }

    /// Attach the command's help so the host can render it directly.
    pub fn with_help(mut self, command: &SlashCommand) -> Self {
        self.usage = command.usage.clone();
        self.examples = command.examples.clone();
        self.command_name = Some(command.name.clone());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ignore(_ctx: CommandContext) -> Result<()> {
        Ok(())
    }

    fn noop() -> Arc<dyn CommandAction> {
        action_fn(ignore)
    }

    #[test]
    fn well_formed_requires_single_token_name() {
        assert!(SlashCommand::new("hello", "", noop()).is_well_formed());
        assert!(!SlashCommand::new("", "", noop()).is_well_formed());
        assert!(!SlashCommand::new("two words", "", noop()).is_well_formed());
    }

    #[test]
    fn suggestion_label_is_slash_name() {
        let cmd = SlashCommand::new("reset", "Start over", noop()).alias("r").usage("/reset");
        let item = cmd.to_suggestion();
        assert_eq!(item.completion(), "/reset");
        assert_eq!(item.aliases, vec!["r"]);
        assert_eq!(item.usage.as_deref(), Some("/reset"));
    }

    #[test]
    fn failure_with_help_serializes_everything() {
        let cmd = SlashCommand::new("hello", "", noop()).usage("/hello --name <n>").example("/hello --name World");
        let result = CommandExecuteResult::failed("Missing required option: name").with_help(&cmd);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["wasCommand"], true);
        assert_eq!(json["success"], false);
        assert_eq!(json["usage"], "/hello --name <n>");
        assert_eq!(json["examples"][0], "/hello --name World");
        assert_eq!(json["commandName"], "hello");
    }
}
