/// Suggestion session: per-keystroke fetches with stale responses dropped.
///
/// Every `update` takes a ticket. A fetch that resolves after a newer ticket
/// was issued is discarded, so a slow response for `/he` can never overwrite
/// the list already shown for `/hel`.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chatline_logging::{EventLogger, TriggerEvent};
use serde::Serialize;
use tracing::{debug, warn};

use crate::detection::fuzzy_score;
use crate::error::{TriggerError, guarded};
use crate::manager::TriggerManager;
use crate::types::SuggestionItem;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 20;

/// Identity of one suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionTicket {
    pub generation: u64,
    pub input: String,
    /// Pattern of the trigger active for `input`, if any.
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SuggestionState {
    /// Nothing to show; the host hides its suggestion list.
    Closed,
    Ready {
        pattern: String,
        query: String,
        items: Vec<SuggestionItem>,
    },
    /// The source failed. The input stays editable.
    Failed { pattern: String, error: String },
}

pub struct SuggestionSession {
    manager: Arc<TriggerManager>,
    generation: AtomicU64,
    latest: Mutex<Option<SuggestionTicket>>,
    limit: usize,
    agent: String,
}

impl SuggestionSession {
    pub fn new(manager: Arc<TriggerManager>) -> Self {
        Self {
            manager,
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
            limit: DEFAULT_SUGGESTION_LIMIT,
            agent: String::new(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Agent id recorded on emitted events.
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn manager(&self) -> &Arc<TriggerManager> {
        &self.manager
    }

    /// Issue a ticket for `input`, superseding every earlier ticket.
    pub fn begin(&self, input: &str) -> SuggestionTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let ticket = SuggestionTicket {
            generation,
            input: input.to_string(),
            pattern: self.manager.detect_trigger(input).map(|t| t.pattern().to_string()),
        };
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(ticket.clone());
        }
        ticket
    }

    /// Whether `ticket` is still the most recent one.
    pub fn is_current(&self, ticket: &SuggestionTicket) -> bool {
        self.latest
            .lock()
            .map(|latest| latest.as_ref() == Some(ticket))
            .unwrap_or(false)
    }

    /// Fetch suggestions for the latest input. Returns `None` when a newer
    /// `update` was issued while this one was in flight.
    pub async fn update(&self, input: &str) -> Option<SuggestionState> {
        let ticket = self.begin(input);
        let state = self.fetch(&ticket).await;

        if self.is_current(&ticket) {
            Some(state)
        } else {
            debug!(
                "[Suggestions] Dropping stale response for {:?} (generation {})",
                ticket.input, ticket.generation
            );
            None
        }
    }

    /// Resolve the suggestion state for `ticket` without the staleness check.
    pub async fn fetch(&self, ticket: &SuggestionTicket) -> SuggestionState {
        let Some(pattern) = ticket.pattern.as_deref() else {
            return SuggestionState::Closed;
        };
        let Some(trigger) = self.manager.trigger_by_pattern(pattern) else {
            return SuggestionState::Closed;
        };
        if trigger.closes_suggestions(&ticket.input) {
            return SuggestionState::Closed;
        }

        let query = trigger.parse(&ticket.input).query;
        match guarded(trigger.suggestions(&ticket.input)).await {
            Ok(items) => {
                // An empty list closes, including one emptied by the limit.
                let items = rank_suggestions(items, &query, self.limit);
                if items.is_empty() {
                    return SuggestionState::Closed;
                }
                EventLogger::log_event(
                    &self.agent,
                    TriggerEvent::SuggestionsServed {
                        pattern: pattern.to_string(),
                        query: query.clone(),
                        count: items.len(),
                    },
                );
                SuggestionState::Ready { pattern: pattern.to_string(), query, items }
            }
            Err(cause) => {
                warn!("[Suggestions] '{}' source failed: {}", pattern, cause);
                EventLogger::log_event(
                    &self.agent,
                    TriggerEvent::SuggestionsFailed { pattern: pattern.to_string(), error: cause.clone() },
                );
                SuggestionState::Failed {
                    pattern: pattern.to_string(),
                    error: TriggerError::SuggestionFetch(cause).to_string(),
                }
            }
        }
    }
}

/// Order by the best fuzzy score of name or alias, keeping source order for
/// ties, then cut to `limit`.
pub fn rank_suggestions(items: Vec<SuggestionItem>, query: &str, limit: usize) -> Vec<SuggestionItem> {
    let mut scored: Vec<(u32, SuggestionItem)> = items
        .into_iter()
        .map(|item| {
            let score = std::iter::once(&item.name)
                .chain(item.aliases.iter())
                .map(|candidate| fuzzy_score(candidate, query))
                .max()
                .unwrap_or(0);
            (score, item)
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::Trigger;
    use crate::types::{TriggerContext, TriggerResult};
    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn item(name: &str, aliases: &[&str]) -> SuggestionItem {
        SuggestionItem {
            name: name.into(),
            label: format!("/{name}"),
            description: String::new(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            usage: None,
            examples: Vec::new(),
        }
    }

    fn names(items: &[SuggestionItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    /// `/` trigger whose list depends on the input. `/slow` waits for the gate.
    struct ListTrigger {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl Trigger for ListTrigger {
        fn pattern(&self) -> &str {
            "/"
        }

        fn priority(&self) -> i32 {
            10
        }

        fn closes_suggestions(&self, input: &str) -> bool {
            input.contains(' ')
        }

        async fn suggestions(&self, input: &str) -> Result<Vec<SuggestionItem>> {
            match input {
                "/slow" => {
                    self.gate.notified().await;
                    Ok(vec![item("slow", &[])])
                }
                "/none" => Ok(Vec::new()),
                "/fail" => bail!("index missing"),
                "/panic" => panic!("source blew up"),
                _ => Ok(vec![item("chelp", &[]), item("status", &[]), item("help", &["h"])]),
            }
        }

        async fn execute(&self, _ctx: &TriggerContext) -> Result<TriggerResult> {
            Ok(TriggerResult::succeeded())
        }
    }

    fn session() -> (SuggestionSession, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mut manager = TriggerManager::new();
        manager.register(Arc::new(ListTrigger { gate: gate.clone() }));
        (SuggestionSession::new(Arc::new(manager)), gate)
    }

    #[test]
    fn ranking_prefers_better_scores_and_keeps_ties_stable() {
        let items = vec![item("chelp", &[]), item("status", &[]), item("helper", &[]), item("hx", &["help"])];
        let ranked = rank_suggestions(items, "help", 10);
        assert_eq!(names(&ranked), vec!["hx", "helper", "chelp", "status"]);

        let items = vec![item("b", &[]), item("a", &[])];
        assert_eq!(names(&rank_suggestions(items, "", 10)), vec!["b", "a"]);
    }

    #[test]
    fn ranking_truncates_to_limit() {
        let items = vec![item("a", &[]), item("b", &[]), item("c", &[])];
        assert_eq!(rank_suggestions(items, "", 2).len(), 2);
    }

    #[test]
    fn tickets_supersede_each_other() {
        let (session, _) = session();
        let first = session.begin("/he");
        let second = session.begin("/hel");
        assert!(second.generation > first.generation);
        assert!(!session.is_current(&first));
        assert!(session.is_current(&second));
        assert_eq!(second.pattern.as_deref(), Some("/"));
        assert_eq!(session.begin("plain").pattern, None);
    }

    #[tokio::test]
    async fn ready_items_are_ranked_against_query() {
        let (session, _) = session();
        let state = session.update("/help").await.unwrap();
        let SuggestionState::Ready { pattern, query, items } = state else {
            panic!("expected ready, got {state:?}");
        };
        assert_eq!(pattern, "/");
        assert_eq!(query, "help");
        assert_eq!(names(&items), vec!["help", "chelp", "status"]);
    }

    #[tokio::test]
    async fn closes_without_trigger_after_space_or_when_empty() {
        let (session, _) = session();
        assert_eq!(session.update("hello").await, Some(SuggestionState::Closed));
        assert_eq!(session.update("/help me").await, Some(SuggestionState::Closed));
        assert_eq!(session.update("/none").await, Some(SuggestionState::Closed));
    }

    #[tokio::test]
    async fn zero_limit_closes_instead_of_serving_nothing() {
        let (session, _) = session();
        let session = session.with_limit(0);
        assert_eq!(session.update("/he").await, Some(SuggestionState::Closed));
    }

    #[tokio::test]
    async fn source_errors_and_panics_become_failed_state() {
        let (session, _) = session();
        for input in ["/fail", "/panic"] {
            let state = session.update(input).await;
            assert_eq!(
                state,
                Some(SuggestionState::Failed {
                    pattern: "/".into(),
                    error: "Failed to load suggestions".into(),
                })
            );
        }
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let (session, gate) = session();

        let (slow, fast) = tokio::join!(session.update("/slow"), async {
            let state = session.update("/he").await;
            gate.notify_one();
            state
        });

        assert_eq!(slow, None);
        assert!(matches!(fast, Some(SuggestionState::Ready { .. })));
    }
}
