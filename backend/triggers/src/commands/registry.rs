/// Agent-scoped command registry.
use std::sync::Arc;

use tracing::debug;

use crate::commands::types::{AgentCommands, SlashCommand};
use crate::registry::TriggerRegistry;

/// Commands available to one agent: built-ins first, then the agent's own.
#[derive(Default)]
pub struct CommandRegistry {
    inner: TriggerRegistry<SlashCommand>,
    agent: String,
}

impl CommandRegistry {
    pub fn new(agent: impl Into<String>) -> Self {
        Self { inner: TriggerRegistry::new(), agent: agent.into() }
    }

    /// Build the registry for `agent`. Malformed agent entries are skipped.
    pub fn load(agent: &str, builtins: &[SlashCommand], agent_commands: &AgentCommands) -> Self {
        let mut registry = Self::new(agent);
        for command in builtins {
            registry.register(command.clone());
        }
        for (export, command) in agent_commands {
            if command.is_well_formed() {
                registry.register(command.clone());
            } else {
                debug!("[Commands] Skipping malformed command export '{}' for agent '{}'", export, agent);
            }
        }
        debug!("[Commands] Loaded {} commands for agent '{}'", registry.count(), agent);
        registry
    }

    pub fn register(&mut self, command: SlashCommand) -> Arc<SlashCommand> {
        self.inner.register(command)
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// By name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<SlashCommand>> {
        self.inner.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.has(name)
    }

    pub fn all(&self) -> Vec<Arc<SlashCommand>> {
        self.inner.all()
    }

    /// Name and alias search, extended to descriptions.
    pub fn search(&self, query: &str) -> Vec<Arc<SlashCommand>> {
        self.inner
            .search_by(query, |command, query| command.description.to_lowercase().contains(query))
    }

    pub fn count(&self) -> usize {
        self.inner.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::{CommandContext, action_fn};

    async fn ignore(_ctx: CommandContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn command(name: &str, description: &str) -> SlashCommand {
        SlashCommand::new(name, description, action_fn(ignore))
    }

    fn names(commands: &[Arc<SlashCommand>]) -> Vec<&str> {
        commands.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn load_skips_malformed_entries() {
        let mut agent = AgentCommands::new();
        agent.insert("deploy".into(), command("deploy", "Ship it"));
        agent.insert("broken".into(), command("", "no name"));
        agent.insert("spaced".into(), command("a b", "bad name"));

        let registry = CommandRegistry::load("ops", &[command("hello", "Greet")], &agent);
        assert_eq!(names(&registry.all()), vec!["hello", "deploy"]);
        assert_eq!(registry.agent(), "ops");
    }

    #[test]
    fn agent_command_overrides_builtin_key() {
        let mut agent = AgentCommands::new();
        agent.insert("hello".into(), command("hello", "Agent greeting"));

        let registry = CommandRegistry::load("a", &[command("hello", "Builtin greeting")], &agent);
        assert_eq!(registry.get("hello").unwrap().description, "Agent greeting");
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn search_also_matches_description() {
        let registry = CommandRegistry::load(
            "a",
            &[command("clear", "Wipe the conversation"), command("reset", "Start over").alias("r")],
            &AgentCommands::new(),
        );
        assert_eq!(names(&registry.search("wipe")), vec!["clear"]);
        assert_eq!(names(&registry.search("re")), vec!["reset"]);
        assert_eq!(names(&registry.search("")), vec!["clear", "reset"]);
        assert!(registry.has("r"));
    }
}
