//! Prompt commands: agent commands declared in config whose action renders a
//! template and sends it as a chat message.

use anyhow::Result;
use async_trait::async_trait;
use chatline_config::{ChatlineConfig, PromptCommandDef};
use chatline_triggers::{AgentCommands, ArgValue, CommandAction, CommandArgs, CommandContext, SlashCommand};
use std::sync::Arc;

pub struct PromptAction {
    template: String,
}

impl PromptAction {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }
}

#[async_trait]
impl CommandAction for PromptAction {
    async fn run(&self, ctx: &CommandContext) -> Result<()> {
        let prompt = render_template(&self.template, &ctx.args_string, &ctx.args);
        ctx.chat.send_message(&prompt).await
    }
}

/// `{args}` is the raw argument text, `{0}` `{1}`... positional tokens and
/// `{key}` a named option. Anything unresolved renders empty; a `{` without a
/// closing brace is kept as is.
pub fn render_template(template: &str, args_string: &str, args: &CommandArgs) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let key = &after[..close];
        if key == "args" {
            out.push_str(args_string.trim());
        } else if let Ok(index) = key.parse::<usize>() {
            out.push_str(args.positional().get(index).map(String::as_str).unwrap_or(""));
        } else if let Some(value) = args.get(key) {
            out.push_str(&display_value(value));
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn display_value(value: &ArgValue) -> String {
    match value {
        ArgValue::String(s) => s.clone(),
        ArgValue::Bool(b) => b.to_string(),
        ArgValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{n:.0}"),
        ArgValue::Number(n) => n.to_string(),
        ArgValue::List(items) => items.join(", "),
    }
}

pub fn to_slash_command(def: &PromptCommandDef) -> SlashCommand {
    let mut command = SlashCommand::new(def.name.clone(), def.description.clone(), Arc::new(PromptAction::new(&def.template)));
    command.aliases = def.aliases.clone();
    command.usage = def.usage.clone();
    command.examples = def.examples.clone();
    command.options = def.options.clone();
    command
}

/// Commands declared for `agent`, keyed by name.
pub fn agent_commands(config: &ChatlineConfig, agent: &str) -> AgentCommands {
    config
        .agents
        .get(agent)
        .map(|agent_config| {
            agent_config
                .commands
                .iter()
                .map(|def| (def.name.clone(), to_slash_command(def)))
                .collect()
        })
        .unwrap_or_default()
}
