//! Lifecycle hooks for the agent.
//!
//! A hook listens to two events on the agent's history:
//!
//! - `AgentInitialized` - fired once before the first model call; the hook
//!   may replace the starting history and extend the system prompt.
//! - `MessageAdded` - fired after every append to the live history; the
//!   hook sees the whole history but is expected to read only the latest
//!   message.
//!
//! # Example
//!
//! ```ignore
//! struct Audit;
//!
//! #[async_trait]
//! impl AgentHook for Audit {
//!     fn id(&self) -> &str { "audit" }
//!
//!     async fn on_message_added(&self, event: &MessageAddedEvent<'_>) {
//!         tracing::info!("history now has {} messages", event.messages.len());
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::ChatMessage;

/// Event carrying the agent state a hook may seed at start-up.
pub struct AgentInitializedEvent<'a> {
    pub messages: &'a mut Vec<ChatMessage>,
    pub system_prompt: &'a mut String,
}

/// Event carrying the history right after a message was appended.
pub struct MessageAddedEvent<'a> {
    pub messages: &'a [ChatMessage],
}

impl MessageAddedEvent<'_> {
    /// The message whose append fired this event.
    #[must_use]
    pub fn latest(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

#[async_trait]
pub trait AgentHook: Send + Sync {
    /// Hook identifier for logging.
    fn id(&self) -> &str;

    async fn on_agent_initialized(&self, _event: &mut AgentInitializedEvent<'_>) {}

    async fn on_message_added(&self, _event: &MessageAddedEvent<'_>) {}
}

/// Ordered set of hooks attached to one agent.
///
/// Hooks run sequentially in registration order and each is awaited
/// before the next one starts.
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn AgentHook>>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Arc<dyn AgentHook>) {
        info!("Registering hook: {}", hook.id());
        self.hooks.push(hook);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub async fn dispatch_initialized(&self, event: &mut AgentInitializedEvent<'_>) {
        for hook in &self.hooks {
            debug!("Dispatching AgentInitialized to {}", hook.id());
            hook.on_agent_initialized(event).await;
        }
    }

    pub async fn dispatch_message_added(&self, event: &MessageAddedEvent<'_>) {
        for hook in &self.hooks {
            debug!("Dispatching MessageAdded to {}", hook.id());
            hook.on_message_added(event).await;
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|h| h.id()))
            .finish()
    }
}
