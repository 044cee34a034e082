//! Config defaults: fills every value the YAML left unset.

use crate::schema::{ChatlineConfig, CommandsConfig, LoggingConfig, MentionsConfig, SuggestionsConfig};

/// Agent used when neither the config nor the command line names one.
pub const DEFAULT_AGENT: &str = "default";

// Engine defaults live with the engine; the config only fills them in.
pub use chatline_triggers::commands::DEFAULT_COMMAND_PRIORITY;
pub use chatline_triggers::mention::DEFAULT_MENTION_PRIORITY;
pub use chatline_triggers::suggest::DEFAULT_SUGGESTION_LIMIT;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ChatlineConfig) -> ChatlineConfig {
    let config = apply_agent_default(config);
    let config = apply_command_defaults(config);
    let config = apply_mention_defaults(config);
    let config = apply_suggestion_defaults(config);
    apply_logging_defaults(config)
}

fn apply_agent_default(mut config: ChatlineConfig) -> ChatlineConfig {
    if config.agent.as_deref().is_none_or(|agent| agent.trim().is_empty()) {
        config.agent = Some(DEFAULT_AGENT.to_string());
    }
    config
}

fn apply_command_defaults(mut config: ChatlineConfig) -> ChatlineConfig {
    let commands = config.commands.get_or_insert_with(CommandsConfig::default);
    commands.priority.get_or_insert(DEFAULT_COMMAND_PRIORITY);
    commands.strict_options.get_or_insert(true);
    commands.comment_guard.get_or_insert(true);
    config
}

fn apply_mention_defaults(mut config: ChatlineConfig) -> ChatlineConfig {
    let mentions = config.mentions.get_or_insert_with(MentionsConfig::default);
    mentions.enabled.get_or_insert(true);
    mentions.priority.get_or_insert(DEFAULT_MENTION_PRIORITY);
    config
}

fn apply_suggestion_defaults(mut config: ChatlineConfig) -> ChatlineConfig {
    let suggestions = config.suggestions.get_or_insert_with(SuggestionsConfig::default);
    suggestions.limit.get_or_insert(DEFAULT_SUGGESTION_LIMIT);
    config
}

fn apply_logging_defaults(mut config: ChatlineConfig) -> ChatlineConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_section() {
        let cfg = apply_all_defaults(ChatlineConfig::default());
        assert_eq!(cfg.agent.as_deref(), Some(DEFAULT_AGENT));

        let commands = cfg.commands.unwrap();
        assert_eq!(commands.priority, Some(DEFAULT_COMMAND_PRIORITY));
        assert_eq!(commands.strict_options, Some(true));
        assert_eq!(commands.comment_guard, Some(true));

        let mentions = cfg.mentions.unwrap();
        assert_eq!(mentions.enabled, Some(true));
        assert_eq!(mentions.priority, Some(DEFAULT_MENTION_PRIORITY));

        assert_eq!(cfg.suggestions.unwrap().limit, Some(DEFAULT_SUGGESTION_LIMIT));
        assert_eq!(cfg.logging.unwrap().level.as_deref(), Some(DEFAULT_LOG_LEVEL));
    }

    #[test]
    fn does_not_override_user_values() {
        let mut cfg = ChatlineConfig::default();
        cfg.agent = Some("ops".into());
        cfg.commands = Some(CommandsConfig { priority: Some(3), strict_options: Some(false), ..Default::default() });

        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.agent.as_deref(), Some("ops"));
        let commands = cfg.commands.unwrap();
        assert_eq!(commands.priority, Some(3));
        assert_eq!(commands.strict_options, Some(false));
        assert_eq!(commands.comment_guard, Some(true));
    }

    #[test]
    fn blank_agent_is_replaced() {
        let mut cfg = ChatlineConfig::default();
        cfg.agent = Some("  ".into());
        assert_eq!(apply_all_defaults(cfg).agent.as_deref(), Some(DEFAULT_AGENT));
    }

    #[test]
    fn unset_values_match_engine_defaults() {
        let cfg = apply_all_defaults(ChatlineConfig::default());
        let engine = chatline_triggers::TriggerManagerConfig::default();

        assert_eq!(cfg.commands.unwrap().priority, Some(engine.command_priority));
        assert_eq!(cfg.mentions.unwrap().priority, Some(engine.mention_priority));
        assert_eq!(cfg.agent.as_deref(), Some(engine.agent.as_str()));
        assert_eq!(cfg.suggestions.unwrap().limit, Some(chatline_triggers::suggest::DEFAULT_SUGGESTION_LIMIT));
    }
}
