/// Built-in commands, registered for every agent before its own commands.
use crate::commands::types::{SlashCommand, action_fn};

/// `/hello [name]`: sends a greeting through the chat handle.
pub fn hello_command() -> SlashCommand {
    SlashCommand::new(
        "hello",
        "Say hello",
        action_fn(|ctx| async move {
            let name = ctx.args.positional().first().map(String::as_str).unwrap_or("World");
            ctx.chat
                .send_message(&format!("Hello {name}! This is a test command."))
                .await
        }),
    )
    .usage("[name]")
    .example("")
    .example("World")
    .example("Alice")
}

pub fn builtin_commands() -> Vec<SlashCommand> {
    vec![hello_command()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::CommandArgs;
    use crate::commands::types::CommandContext;
    use crate::types::{ChatHandle, ChatStatus};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::Map;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingChat {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatHandle for RecordingChat {
        async fn send_message(&self, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn status(&self) -> ChatStatus {
            ChatStatus::Ready
        }
    }

    fn ctx(chat: Arc<RecordingChat>, tokens: &[&str]) -> CommandContext {
        CommandContext {
            chat,
            raw_input: String::new(),
            trigger_char: "/".into(),
            metadata: Map::new(),
            command_name: "hello".into(),
            args: CommandArgs::Tokens(tokens.iter().map(|t| t.to_string()).collect()),
            args_string: tokens.join(" "),
            agent: "default".into(),
        }
    }

    #[tokio::test]
    async fn hello_greets_first_token_or_world() {
        let chat = Arc::new(RecordingChat::default());
        let hello = hello_command();
        hello.action.run(&ctx(chat.clone(), &["Alice", "Bob"])).await.unwrap();
        hello.action.run(&ctx(chat.clone(), &[])).await.unwrap();

        let sent = chat.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![
                "Hello Alice! This is a test command.".to_string(),
                "Hello World! This is a test command.".to_string(),
            ]
        );
    }

    #[test]
    fn builtins_are_well_formed() {
        assert!(builtin_commands().iter().all(SlashCommand::is_well_formed));
    }
}
