//! Request-response agent with a hook-observed history.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AgentError, Result};
use crate::hooks::{AgentHook, AgentInitializedEvent, HookRegistry, MessageAddedEvent};
use crate::util::{DEFAULT_SYSTEM_PROMPT, preview};
use crate::{ChatMessage, LLMProvider, Role};

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model identifier; empty means the provider's default.
    pub model: String,
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// One agent instance serves one invocation.
///
/// The history lives only as long as the agent; durable history is the
/// business of whatever hook is registered.
pub struct Agent<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    config: AgentConfig,
    hooks: HookRegistry,
    messages: Vec<ChatMessage>,
    system_prompt: String,
    initialized: bool,
}

impl<P> Agent<P>
where
    P: LLMProvider + Send + Sync,
{
    pub fn new(provider: P, config: AgentConfig) -> Self {
        let system_prompt = config.system_prompt.clone();
        Self {
            provider,
            config,
            hooks: HookRegistry::new(),
            messages: Vec::new(),
            system_prompt,
            initialized: false,
        }
    }

    /// Attach a lifecycle hook.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn AgentHook>) -> Self {
        self.hooks.register(hook);
        self
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    #[must_use]
    pub const fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    fn model(&self) -> &str {
        if self.config.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.config.model
        }
    }

    /// Fire the initialized event. Later calls do nothing.
    pub async fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let mut event = AgentInitializedEvent {
            messages: &mut self.messages,
            system_prompt: &mut self.system_prompt,
        };
        self.hooks.dispatch_initialized(&mut event).await;

        info!(
            "Agent initialized with {} history messages and {} hooks",
            self.messages.len(),
            self.hooks.len()
        );
    }

    async fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
        let event = MessageAddedEvent {
            messages: &self.messages,
        };
        self.hooks.dispatch_message_added(&event).await;
    }

    /// Run one user turn and return the model's reply.
    pub async fn invoke(&mut self, user_text: &str) -> Result<String> {
        self.initialize().await;

        self.append(ChatMessage::text(Role::User, user_text)).await;

        info!(
            "Invoking model {} with {} messages",
            self.model(),
            self.messages.len()
        );

        let response = self
            .provider
            .chat(&self.system_prompt, &self.messages, self.model())
            .await
            .map_err(AgentError::Provider)?;

        if response.content.trim().is_empty() {
            return Err(AgentError::EmptyResponse);
        }

        if let Some(usage) = &response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        debug!("Model replied: {}", preview(&response.content, 100));

        self.append(ChatMessage::text(Role::Assistant, response.content.clone()))
            .await;

        Ok(response.content)
    }
}
