//! Console chat handle: the stand-in for a model-backed chat session.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chatline_triggers::{ChatHandle, ChatStatus};

use crate::terminal_output::note_sent;

pub struct ConsoleChat {
    sent: Mutex<Vec<String>>,
    status: Mutex<ChatStatus>,
    echo: bool,
}

impl ConsoleChat {
    /// Prints every sent message.
    pub fn new() -> Self {
        Self { sent: Mutex::new(Vec::new()), status: Mutex::new(ChatStatus::Ready), echo: true }
    }

    /// Records without printing.
    pub fn quiet() -> Self {
        Self { echo: false, ..Self::new() }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn set_status(&self, status: ChatStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
    }
}

impl Default for ConsoleChat {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatHandle for ConsoleChat {
    async fn send_message(&self, text: &str) -> Result<()> {
        if self.echo {
            note_sent(text);
        }
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("message log poisoned"))?
            .push(text.to_string());
        Ok(())
    }

    fn status(&self) -> ChatStatus {
        self.status.lock().map(|status| *status).unwrap_or(ChatStatus::Error)
    }
}
