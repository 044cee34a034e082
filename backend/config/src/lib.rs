//! `chatline-config`: runtime configuration for the chatline host.
//!
//! Provides:
//! - Typed config schema (trigger settings, logging, per-agent prompt commands)
//! - YAML loading from the config directory
//! - Default value application
//! - Path-addressed validation

pub mod defaults;
pub mod io;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use io::{config_dir, config_file_path, load_config, parse_config};
pub use schema::{
    AgentConfig, ChatlineConfig, CommandsConfig, LoggingConfig, MentionsConfig, PromptCommandDef, SuggestionsConfig,
};
pub use validation::{ConfigValidationError, ValidationReport, validate};

use anyhow::Result;
use std::path::Path;

/// Load, apply defaults and validate a config file.
///
/// Problems are logged but do not fail the load: malformed commands are
/// skipped when the registry is built.
pub async fn load_and_prepare(path: &Path) -> Result<ChatlineConfig> {
    let config = apply_all_defaults(load_config(path).await?);
    log_report(&validate(&config));
    Ok(config)
}

fn log_report(report: &ValidationReport) {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepared_config_has_defaults_even_when_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "suggestions:\n  limit: 0\nagents:\n  ops:\n    commands:\n      - name: ''\n")
            .await
            .unwrap();

        let cfg = load_and_prepare(&path).await.unwrap();
        assert_eq!(cfg.agent.as_deref(), Some(defaults::DEFAULT_AGENT));
        assert_eq!(cfg.suggestions.unwrap().limit, Some(0));
        assert_eq!(cfg.agents["ops"].commands.len(), 1);
    }
}
