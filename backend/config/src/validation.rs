//! Config validation: path-addressed errors and warnings.

use std::collections::HashSet;

use crate::schema::{ChatlineConfig, PromptCommandDef};
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ChatlineConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_suggestions(config, &mut report);
    validate_logging(config, &mut report);
    validate_mentions(config, &mut report);
    validate_agents(config, &mut report);
    report
}

fn validate_suggestions(config: &ChatlineConfig, report: &mut ValidationReport) {
    let Some(suggestions) = &config.suggestions else { return };
    if suggestions.limit == Some(0) {
        report.error("suggestions.limit", "limit must be >= 1");
    }
}

/// Plain levels, or an `EnvFilter` directive such as `chatline=debug`.
fn validate_logging(config: &ChatlineConfig, report: &mut ValidationReport) {
    let Some(level) = config.logging.as_ref().and_then(|l| l.level.as_deref()) else { return };
    if !level.contains('=') && !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        report.error(
            "logging.level",
            format!("Unknown log level '{level}'. Use one of: {}", LOG_LEVELS.join(", ")),
        );
    }
}

fn validate_mentions(config: &ChatlineConfig, report: &mut ValidationReport) {
    let Some(mentions) = &config.mentions else { return };
    for (i, target) in mentions.targets.iter().enumerate() {
        let path = format!("mentions.targets[{i}]");
        if target.name.trim().is_empty() {
            report.error(format!("{path}.name"), "Mention target name cannot be empty");
        } else if !is_identifier(&target.name) {
            report.warn(
                format!("{path}.name"),
                format!("'{}' contains characters a mention cannot match", target.name),
            );
        }
    }
}

fn validate_agents(config: &ChatlineConfig, report: &mut ValidationReport) {
    for (agent, agent_config) in &config.agents {
        if agent.trim().is_empty() {
            report.error("agents", "Agent id cannot be empty");
        }

        let mut seen = HashSet::new();
        for (i, command) in agent_config.commands.iter().enumerate() {
            let path = format!("agents.{agent}.commands[{i}]");
            validate_command(command, &path, report);

            for key in std::iter::once(&command.name).chain(command.aliases.iter()) {
                if !key.is_empty() && !seen.insert(key.as_str()) {
                    report.warn(
                        &path,
                        format!("'{key}' is already used by an earlier command; this one takes over"),
                    );
                }
            }
        }
    }
}

fn validate_command(command: &PromptCommandDef, path: &str, report: &mut ValidationReport) {
    let name = command.name.as_str();
    if name.trim().is_empty() {
        report.error(format!("{path}.name"), "Command name cannot be empty");
    } else if name.starts_with('/') {
        report.error(format!("{path}.name"), format!("Drop the leading '/' from '{name}'"));
    } else if name.chars().any(char::is_whitespace) {
        report.error(format!("{path}.name"), format!("Command name '{name}' cannot contain whitespace"));
    }

    if command.template.trim().is_empty() {
        report.error(format!("{path}.template"), "Template cannot be empty");
    }

    for placeholder in placeholders(&command.template) {
        let declared = command.options.as_ref().is_some_and(|o| o.contains_key(placeholder));
        if placeholder != "args" && placeholder.parse::<usize>().is_err() && !declared {
            report.warn(
                format!("{path}.template"),
                format!("Placeholder {{{placeholder}}} has no matching option and will render empty"),
            );
        }
    }
}

fn is_identifier(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
}

/// Names inside `{...}` in a template.
fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let name = &after[..close];
                if !name.is_empty() {
                    found.push(name);
                }
                rest = &after[close + 1..];
            }
            Some(next) => rest = &after[next..],
            None => break,
        }
    }
    found
}
