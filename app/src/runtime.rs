//! Invocation entrypoint: one payload in, one response out.
//!
//! Every request gets a fresh agent. When memory is configured the agent
//! carries a [`MemoryHook`] keyed by the request's session, so history
//! survives across requests through the store alone.

use agentrt_config::Config;
use agentrt_core::util::preview;
use agentrt_core::{
    Agent, AgentConfig, AgentError, InvocationRequest, LLMProvider, MemoryStore,
};
use agentrt_memory::{DatabaseMemoryStore, InMemoryStore, MemoryHook};
use agentrt_providers::ChatCompletionsProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why an invocation produced an error response.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Agent model not initialized. Check the start-up logs for provider errors.")]
    ModelUnavailable,

    #[error(
        "Model access not enabled. Request access for this model in the provider console \
         or switch to an approved model."
    )]
    ModelAccessDenied,

    #[error(
        "Marketplace permissions missing. The runtime role needs marketplace permissions; \
         wait a few minutes after granting them, then retry."
    )]
    MarketplacePermissions,

    #[error("Error: {0}")]
    Agent(AgentError),
}

impl From<AgentError> for InvocationError {
    fn from(err: AgentError) -> Self {
        let text = match &err {
            AgentError::Provider(cause) => format!("{cause:#}"),
            other => other.to_string(),
        };
        if text.contains("Model use case details") && text.contains("Anthropic") {
            Self::ModelAccessDenied
        } else if text.to_lowercase().contains("aws-marketplace") {
            Self::MarketplacePermissions
        } else {
            Self::Agent(err)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status: Status,
    pub response: String,
    pub session_id: String,
    pub actor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_enabled: Option<bool>,
}

impl InvocationResponse {
    fn success(request: &InvocationRequest, response: String, memory_enabled: bool) -> Self {
        Self {
            status: Status::Success,
            response,
            session_id: request.session_id.clone(),
            actor_id: request.actor_id.clone(),
            memory_enabled: Some(memory_enabled),
        }
    }

    fn error(request: &InvocationRequest, err: &InvocationError) -> Self {
        Self {
            status: Status::Error,
            response: err.to_string(),
            session_id: request.session_id.clone(),
            actor_id: request.actor_id.clone(),
            memory_enabled: None,
        }
    }
}

pub struct Runtime {
    provider: Option<Arc<dyn LLMProvider>>,
    store: Option<Arc<dyn MemoryStore>>,
    config: Config,
    system_prompt: String,
}

impl Runtime {
    pub fn new(
        config: Config,
        provider: Option<Arc<dyn LLMProvider>>,
        store: Option<Arc<dyn MemoryStore>>,
    ) -> Self {
        let system_prompt = config.system_prompt();
        Self {
            provider,
            store,
            config,
            system_prompt,
        }
    }

    /// Build provider and store from configuration.
    ///
    /// Neither a missing API key nor an unreachable memory database stops
    /// start-up: the runtime answers with an error response or runs
    /// without memory instead.
    pub async fn from_config(config: Config) -> Self {
        let provider: Option<Arc<dyn LLMProvider>> = if config.provider.api_key.is_empty() {
            warn!("No provider API key configured; invocations will fail");
            None
        } else {
            let mut provider = ChatCompletionsProvider::new(
                config.provider.api_key.clone(),
                config.agent.model.clone(),
            );
            if let Some(base_url) = &config.provider.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Some(Arc::new(provider))
        };

        let store = if config.memory.enabled() {
            Self::connect_store(&config).await
        } else {
            info!("Memory disabled: no memory id configured");
            None
        };

        info!(
            "Runtime ready - Model: {}, Region: {}",
            config.agent.model,
            config.region()
        );
        Self::new(config, provider, store)
    }

    async fn connect_store(config: &Config) -> Option<Arc<dyn MemoryStore>> {
        let Some(url) = &config.memory.database_url else {
            info!("Using process-local memory store");
            return Some(Arc::new(InMemoryStore::new()));
        };

        match DatabaseMemoryStore::new(url).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!("Memory initialization failed: {e:#}");
                None
            }
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn memory_hook(&self, request: &InvocationRequest) -> Option<Arc<MemoryHook>> {
        if !self.config.memory.enabled() {
            return None;
        }
        let store = self.store.clone()?;
        let ctx = request.session_context(&self.config.memory.memory_id);
        Some(Arc::new(
            MemoryHook::new(store, ctx).with_recent_turns(self.config.memory.recent_turns),
        ))
    }

    /// Handle one request payload. Never fails; errors become an error
    /// response.
    pub async fn invoke(&self, payload: &Value) -> InvocationResponse {
        let request = InvocationRequest::from_payload(payload);

        info!(
            "Session: {}, Actor: {}",
            request.session_id, request.actor_id
        );
        info!("User input: {}...", preview(&request.user_text, 100));
        info!("Model: {}", self.config.agent.model);
        info!(
            "Memory ID: {}",
            if self.config.memory.enabled() {
                self.config.memory.memory_id.as_str()
            } else {
                "Not configured"
            }
        );
        debug!("Full payload: {payload}");

        let Some(provider) = self.provider.clone() else {
            warn!("Model unavailable; returning error response");
            return InvocationResponse::error(&request, &InvocationError::ModelUnavailable);
        };

        let mut agent = Agent::new(
            provider,
            AgentConfig {
                model: self.config.agent.model.clone(),
                system_prompt: self.system_prompt.clone(),
            },
        );

        let memory_enabled = match self.memory_hook(&request) {
            Some(hook) => {
                agent = agent.with_hook(hook);
                info!("Agent created with memory hooks");
                true
            }
            None => {
                info!("Agent created without memory (disabled or unavailable)");
                false
            }
        };

        match agent.invoke(&request.user_text).await {
            Ok(text) => {
                info!("Response generated: {}...", preview(&text, 100));
                InvocationResponse::success(&request, text, memory_enabled)
            }
            Err(e) => {
                error!("Invocation failed: {e:#}");
                InvocationResponse::error(&request, &InvocationError::from(e))
            }
        }
    }
}
