//! The chat host: routes each submitted line through the trigger manager and
//! serves `?`-prefixed suggestion requests.

use std::sync::Arc;

use anyhow::Result;
use chatline_config::ChatlineConfig;
use chatline_triggers::{
    ChatHandle, ChatStatus, SuggestionItem, SuggestionSession, SuggestionState, TriggerContext, TriggerManager,
    TriggerResult, create_trigger_manager,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::chat::ConsoleChat;
use crate::config::{manager_config, suggestion_limit};
use crate::terminal_output::{note_error, note_info, note_success, note_warn, render_failure, render_suggestions};

/// What happened to one submitted line.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The chat was busy; nothing ran.
    Refused(ChatStatus),
    Trigger(TriggerResult),
    /// No trigger matched; the line went out as a chat message.
    Chat,
}

pub struct Host {
    manager: Arc<TriggerManager>,
    session: SuggestionSession,
    chat: Arc<ConsoleChat>,
    agent: String,
}

impl Host {
    pub fn new(config: &ChatlineConfig, agent: &str, chat: Arc<ConsoleChat>) -> Self {
        let manager = Arc::new(create_trigger_manager(manager_config(config, agent)));
        let session = SuggestionSession::new(manager.clone())
            .with_limit(suggestion_limit(config))
            .with_agent(agent);
        Self { manager, session, chat, agent: agent.to_string() }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub async fn submit(&self, line: &str) -> Result<Submission> {
        let status = self.chat.status();
        if status != ChatStatus::Ready {
            return Ok(Submission::Refused(status));
        }

        match self.manager.detect_trigger(line) {
            Some(trigger) => {
                let ctx = TriggerContext::new(self.chat.clone(), line, trigger.pattern())
                    .with_metadata("agent", self.agent.as_str());
                let result = self.manager.execute(line, &ctx).await;
                if result.was_triggered {
                    return Ok(Submission::Trigger(result));
                }
                // `//` and `/*` lines are claimed by `/` but are plain chat
                debug!("[Host] '{}' declined the input; sending as chat", trigger.pattern());
                self.chat.send_message(line).await?;
                Ok(Submission::Chat)
            }
            None => {
                self.chat.send_message(line).await?;
                Ok(Submission::Chat)
            }
        }
    }

    /// `None` when a newer request superseded this one.
    pub async fn suggest(&self, line: &str) -> Option<SuggestionState> {
        self.session.update(line).await
    }

    /// Every command of the active agent, as suggestion entries.
    pub async fn commands(&self) -> Result<Vec<SuggestionItem>> {
        match self.manager.trigger_by_pattern("/") {
            Some(trigger) => trigger.suggestions("/").await,
            None => Ok(Vec::new()),
        }
    }
}

pub fn report(submission: &Submission) {
    match submission {
        Submission::Refused(status) => note_warn(&format!("Chat is {status:?}; wait for it to be ready")),
        Submission::Trigger(result) if result.is_success() => note_success("Done"),
        Submission::Trigger(result) => note_error(&render_failure(result)),
        Submission::Chat => {}
    }
}

/// Read lines from stdin until EOF or `/exit`.
pub async fn run_repl(host: &Host) -> Result<()> {
    note_info(&format!(
        "chatline ({} agent). '/' runs a command, '?/he' lists suggestions, '/exit' quits.",
        host.agent()
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else { break };
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        if line == "/exit" {
            break;
        }

        if let Some(partial) = line.strip_prefix('?') {
            if let Some(state) = host.suggest(partial).await {
                println!("{}", render_suggestions(&state));
            }
            continue;
        }

        let submission = host.submit(line).await?;
        report(&submission);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatline_config::{AgentConfig, MentionsConfig, PromptCommandDef, apply_all_defaults};
    use chatline_triggers::MentionTarget;

    fn host() -> (Host, Arc<ConsoleChat>) {
        let mut config = ChatlineConfig::default();
        config.mentions = Some(MentionsConfig {
            targets: vec![MentionTarget::new("reviewer", "Code reviewer")],
            ..Default::default()
        });
        config.agents.insert(
            "ops".into(),
            AgentConfig {
                commands: vec![PromptCommandDef {
                    name: "summarize".into(),
                    description: "Summarize the thread".into(),
                    template: "Summarize: {args}".into(),
                    ..Default::default()
                }],
            },
        );
        let config = apply_all_defaults(config);

        let chat = Arc::new(ConsoleChat::quiet());
        (Host::new(&config, "ops", chat.clone()), chat)
    }

    #[tokio::test]
    async fn commands_run_and_chat_passes_through() {
        let (host, chat) = host();

        let submission = host.submit("/summarize last hour").await.unwrap();
        assert!(matches!(submission, Submission::Trigger(ref r) if r.is_success()));

        assert_eq!(host.submit("just chatting").await.unwrap(), Submission::Chat);
        assert_eq!(host.submit("// not a command").await.unwrap(), Submission::Chat);

        assert_eq!(chat.sent(), vec!["Summarize: last hour", "just chatting", "// not a command"]);
    }

    #[tokio::test]
    async fn mentions_are_resolved() {
        let (host, chat) = host();
        let Submission::Trigger(result) = host.submit("ping @reviewer please").await.unwrap() else {
            panic!("mention should trigger");
        };
        let data = result.data.unwrap();
        assert_eq!(data["resolved"][0]["name"], "reviewer");
        assert_eq!(chat.sent(), vec!["ping @reviewer please"]);
    }

    #[tokio::test]
    async fn busy_chat_refuses_submission() {
        let (host, chat) = host();
        chat.set_status(ChatStatus::Streaming);
        assert_eq!(host.submit("/hello").await.unwrap(), Submission::Refused(ChatStatus::Streaming));
        assert!(chat.sent().is_empty());
    }

    #[tokio::test]
    async fn failures_carry_the_error() {
        let (host, _) = host();
        let Submission::Trigger(result) = host.submit("/nope").await.unwrap() else {
            panic!("slash input should trigger");
        };
        assert_eq!(result.error.as_deref(), Some("Unknown command: /nope"));
    }

    #[tokio::test]
    async fn suggestions_and_command_listing() {
        let (host, _) = host();
        let Some(SuggestionState::Ready { items, .. }) = host.suggest("/sum").await else {
            panic!("expected suggestions");
        };
        assert_eq!(items[0].completion(), "/summarize");

        let names: Vec<String> = host.commands().await.unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["hello", "summarize"]);
    }
}
