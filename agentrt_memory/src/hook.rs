//! Conversation memory synchronizer.
//!
//! Bridges the append-only conversation log in a [`MemoryStore`] and the
//! live history of an [`Agent`](agentrt_core::Agent). It hydrates the
//! history once when the agent starts and persists each new message as it
//! is appended. Memory trouble is logged and swallowed: the agent always
//! proceeds, with or without its past.

use agentrt_core::memory::flatten_turns;
use agentrt_core::util::preview;
use agentrt_core::{
    AgentHook, AgentInitializedEvent, ChatMessage, MemoryStore, MessageAddedEvent, SessionContext,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of recent turns loaded at start-up.
pub const DEFAULT_RECENT_TURNS: usize = 5;

/// Appended to the system prompt whenever history was found.
pub const CONTEXT_USAGE_INSTRUCTIONS: &str = "

You have access to our conversation history. Use this context to:
- Maintain continuity across conversation turns
- Reference previously discussed topics
- Build on earlier answers
- Avoid repeating information unnecessarily
";

pub struct MemoryHook<S = Arc<dyn MemoryStore>>
where
    S: Send + Sync,
{
    store: S,
    context: SessionContext,
    recent_turns: usize,
}

impl<S> MemoryHook<S>
where
    S: MemoryStore + Send + Sync,
{
    pub fn new(store: S, context: SessionContext) -> Self {
        info!("MemoryHook initialized - {context}");
        Self {
            store,
            context,
            recent_turns: DEFAULT_RECENT_TURNS,
        }
    }

    /// Override how many recent turns are loaded.
    #[must_use]
    pub fn with_recent_turns(mut self, k: usize) -> Self {
        self.recent_turns = k;
        self
    }

    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Load recent history for the session, oldest first.
    ///
    /// When at least one turn comes back, [`CONTEXT_USAGE_INSTRUCTIONS`] is
    /// appended to `system_prompt`. Every call appends it again. On store
    /// failure the prompt is left alone and the history is empty.
    pub async fn hydrate(&self, system_prompt: &mut String) -> Vec<ChatMessage> {
        self.load(system_prompt).await.unwrap_or_default()
    }

    /// `None` when nothing was loaded: the store failed or had no turns.
    /// `Some` may still be empty when every stored message was skipped.
    async fn load(&self, system_prompt: &mut String) -> Option<Vec<ChatMessage>> {
        info!(
            "Loading conversation history for session {}",
            self.context.session_id
        );

        let turns = match self
            .store
            .get_last_k_turns(&self.context, self.recent_turns)
            .await
        {
            Ok(turns) => turns,
            Err(e) => {
                warn!("Memory load error for {}: {e:#}", self.context);
                return None;
            }
        };

        if turns.is_empty() {
            info!("No previous conversation history found");
            return None;
        }

        let history = flatten_turns(turns);
        info!("Loaded {} previous messages", history.len());

        system_prompt.push_str(CONTEXT_USAGE_INSTRUCTIONS);
        Some(history)
    }

    /// Write one message to the conversation log.
    ///
    /// Only user and assistant messages whose first content block carries
    /// non-empty text are written. Store failures are logged, never raised.
    pub async fn persist(&self, message: &ChatMessage) {
        if !message.role.is_conversational() {
            debug!("Not persisting {} message", message.role);
            return;
        }

        let Some(text) = message.first_text().filter(|t| !t.is_empty()) else {
            debug!("Not persisting {} message without text", message.role);
            return;
        };

        info!(
            "Saving {} message to memory: {}...",
            message.role,
            preview(text, 50)
        );

        let turn = [(text.to_string(), message.role.clone())];
        match self.store.save_conversation(&self.context, &turn).await {
            Ok(()) => info!("Message saved successfully"),
            Err(e) => warn!("Memory save error for {}: {e:#}", self.context),
        }
    }
}

#[async_trait]
impl<S> AgentHook for MemoryHook<S>
where
    S: MemoryStore + Send + Sync,
{
    fn id(&self) -> &str {
        "memory"
    }

    async fn on_agent_initialized(&self, event: &mut AgentInitializedEvent<'_>) {
        if let Some(history) = self.load(event.system_prompt).await {
            *event.messages = history;
        }
    }

    async fn on_message_added(&self, event: &MessageAddedEvent<'_>) {
        if let Some(message) = event.latest() {
            self.persist(message).await;
        }
    }
}
