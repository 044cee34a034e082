use std::path::PathBuf;

use chatline_config::{ChatlineConfig, defaults};
use chatline_triggers::{ProcessorSettings, TriggerManagerConfig};

use crate::prompt::agent_commands;

/// Where the host reads its config from and which agent it runs.
#[derive(Debug, Clone)]
pub struct HostSettings {
    /// Full path to `config.yaml`.
    pub config_path: PathBuf,
    /// Agent from `--agent` or `CHATLINE_AGENT`; beats the config file.
    pub agent_override: Option<String>,
}

impl HostSettings {
    /// Load settings from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self {
            config_path: chatline_config::config_file_path(&chatline_config::config_dir()),
            agent_override: std::env::var("CHATLINE_AGENT").ok().filter(|a| !a.trim().is_empty()),
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_flags(mut self, agent: Option<String>, config: Option<PathBuf>) -> Self {
        if let Some(agent) = agent {
            self.agent_override = Some(agent);
        }
        if let Some(config) = config {
            self.config_path = config;
        }
        self
    }

    pub fn resolve_agent(&self, config: &ChatlineConfig) -> String {
        self.agent_override
            .clone()
            .or_else(|| config.agent.clone())
            .unwrap_or_else(|| defaults::DEFAULT_AGENT.to_string())
    }
}

/// Engine wiring for `agent` from a defaulted config.
pub fn manager_config(config: &ChatlineConfig, agent: &str) -> TriggerManagerConfig {
    let commands = config.commands.clone().unwrap_or_default();
    let mentions = config.mentions.clone().unwrap_or_default();

    TriggerManagerConfig {
        agent: agent.to_string(),
        agent_commands: agent_commands(config, agent),
        command_priority: commands.priority.unwrap_or(defaults::DEFAULT_COMMAND_PRIORITY),
        processor: ProcessorSettings {
            strict_options: commands.strict_options.unwrap_or(true),
            comment_guard: commands.comment_guard.unwrap_or(true),
        },
        mentions: mentions.enabled.unwrap_or(true).then_some(mentions.targets),
        mention_priority: mentions.priority.unwrap_or(defaults::DEFAULT_MENTION_PRIORITY),
    }
}

pub fn suggestion_limit(config: &ChatlineConfig) -> usize {
    config
        .suggestions
        .as_ref()
        .and_then(|s| s.limit)
        .unwrap_or(defaults::DEFAULT_SUGGESTION_LIMIT)
}
