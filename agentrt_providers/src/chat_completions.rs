use agentrt_core::{ChatMessage, LLMProvider, LLMResponse, Usage};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ProviderError;
use crate::retry::{RetryPolicy, retry_with_backoff};

/// Message as sent on the wire: role plus flattened text.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct WireMessage<'a> {
    role: &'a str,
    content: String,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    retry: RetryPolicy,
}

impl ChatCompletionsProvider {
    pub fn new(api_key: String, default_model: String) -> Self {
        info!("Creating ChatCompletionsProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            default_model,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn wire_messages<'a>(
        system_prompt: &'a str,
        messages: &'a [ChatMessage],
    ) -> Vec<WireMessage<'a>> {
        let system = (!system_prompt.is_empty()).then(|| WireMessage {
            role: "system",
            content: system_prompt.to_string(),
        });

        system
            .into_iter()
            .chain(messages.iter().map(|m| WireMessage {
                role: m.role.as_str(),
                content: m.joined_text(),
            }))
            .collect()
    }

    fn parse_response(response: &Value) -> anyhow::Result<LLMResponse> {
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?
            .to_string();

        let count = |u: &serde_json::Map<String, Value>, key: &str| {
            u32::try_from(u.get(key).and_then(Value::as_u64).unwrap_or(0)).unwrap_or(0)
        };
        let usage = response["usage"].as_object().map(|u| Usage {
            prompt_tokens: count(u, "prompt_tokens"),
            completion_tokens: count(u, "completion_tokens"),
            total_tokens: count(u, "total_tokens"),
        });

        Ok(LLMResponse { content, usage })
    }

    /// Send a single request.
    ///
    /// A non-success status becomes [`ProviderError::Status`] with the
    /// response body, which is where providers explain access problems.
    async fn try_send(&self, request: &Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl LLMProvider for ChatCompletionsProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        model: &str,
    ) -> anyhow::Result<LLMResponse> {
        let request = json!({
            "model": model,
            "messages": Self::wire_messages(system_prompt, messages),
        });

        info!("Sending chat completion request: model={model}");

        let response = retry_with_backoff(
            &self.retry,
            || self.try_send(&request),
            ProviderError::is_retryable,
        )
        .await?;

        info!("Received chat completion response");
        Self::parse_response(&response)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}
