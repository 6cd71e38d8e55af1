//! Integration tests for the conversation memory synchronizer.
//!
//! These tests verify that:
//! - Hydration tolerates every turn and message shape the store may return
//! - Store failures never reach the agent
//! - Only user and assistant text messages are persisted
//! - The system prompt suffix follows the history it describes

use agentrt_core::{
    Agent, AgentConfig, AgentHook, AgentInitializedEvent, ChatMessage, ContentBlock, LLMProvider,
    LLMResponse, MemoryStore, Role, SessionContext,
};
use agentrt_memory::{CONTEXT_USAGE_INSTRUCTIONS, InMemoryStore, MemoryHook};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Store stub that returns canned turns and records every call.
#[derive(Default)]
struct ScriptedStore {
    turns: Vec<Value>,
    fail_reads: bool,
    fail_writes: bool,
    reads: Mutex<Vec<usize>>,
    writes: Mutex<Vec<Vec<(String, Role)>>>,
}

impl ScriptedStore {
    fn with_turns(turns: Vec<Value>) -> Self {
        Self {
            turns,
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<Vec<(String, Role)>> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl MemoryStore for ScriptedStore {
    async fn get_last_k_turns(
        &self,
        _ctx: &SessionContext,
        k: usize,
    ) -> anyhow::Result<Vec<Value>> {
        self.reads.lock().unwrap().push(k);
        if self.fail_reads {
            anyhow::bail!("memory service unavailable");
        }
        Ok(self.turns.clone())
    }

    async fn save_conversation(
        &self,
        _ctx: &SessionContext,
        messages: &[(String, Role)],
    ) -> anyhow::Result<()> {
        self.writes.lock().unwrap().push(messages.to_vec());
        if self.fail_writes {
            anyhow::bail!("throttled");
        }
        Ok(())
    }
}

struct EchoProvider;

#[async_trait]
impl LLMProvider for EchoProvider {
    async fn chat(
        &self,
        _system_prompt: &str,
        messages: &[ChatMessage],
        _model: &str,
    ) -> anyhow::Result<LLMResponse> {
        Ok(LLMResponse {
            content: format!("seen {} messages", messages.len()),
            usage: None,
        })
    }

    fn default_model(&self) -> &str {
        "echo"
    }
}

fn ctx() -> SessionContext {
    SessionContext::new("mem-1", "actor-1", "session-1")
}

fn texts(history: &[ChatMessage]) -> Vec<(Role, String)> {
    history
        .iter()
        .map(|m| (m.role.clone(), m.first_text().unwrap_or_default().to_string()))
        .collect()
}

#[tokio::test]
async fn test_hydrate_requests_five_turns() {
    let store = Arc::new(ScriptedStore::default());
    let hook = MemoryHook::new(store.clone(), ctx());

    let mut prompt = String::new();
    hook.hydrate(&mut prompt).await;

    assert_eq!(*store.reads.lock().unwrap(), [5]);
}

#[tokio::test]
async fn test_hydrate_mixed_shapes_in_one_batch() {
    let store = ScriptedStore::with_turns(vec![
        json!({"messages": [
            {"role": "user", "content": {"text": "what is jamcam?"}},
            {"role": "assistant", "content": [{"text": "a motion tracker"}]},
        ]}),
        json!("not a turn"),
        json!({"messages": {"role": "user"}}),
        json!([
            {"role": "user", "text": "tell me more"},
            {"role": "assistant", "content": [{"image": "png"}]},
            7,
            {"role": "system", "text": "be brief"},
        ]),
    ]);
    let hook = MemoryHook::new(store, ctx());

    let mut prompt = "base".to_string();
    let history = hook.hydrate(&mut prompt).await;

    assert_eq!(
        texts(&history),
        [
            (Role::User, "what is jamcam?".to_string()),
            (Role::Assistant, "a motion tracker".to_string()),
            (Role::User, "tell me more".to_string()),
            // System roles read back as user.
            (Role::User, "be brief".to_string()),
        ]
    );
    assert_eq!(prompt, format!("base{CONTEXT_USAGE_INSTRUCTIONS}"));
}

#[tokio::test]
async fn test_hydrate_zero_turns_leaves_prompt_unchanged() {
    let hook = MemoryHook::new(ScriptedStore::default(), ctx());

    let mut prompt = "You are a helpful assistant.".to_string();
    let history = hook.hydrate(&mut prompt).await;

    assert!(history.is_empty());
    assert_eq!(prompt, "You are a helpful assistant.");
}

#[tokio::test]
async fn test_hydrate_store_failure_degrades_to_empty() {
    let store = ScriptedStore {
        fail_reads: true,
        ..ScriptedStore::default()
    };
    let hook = MemoryHook::new(store, ctx());

    let mut prompt = "base".to_string();
    let history = hook.hydrate(&mut prompt).await;

    assert!(history.is_empty());
    assert_eq!(prompt, "base");
}

#[tokio::test]
async fn test_hydrate_all_messages_skipped_still_marks_prompt() {
    let store = ScriptedStore::with_turns(vec![
        json!({"messages": [{"role": "user", "content": {"text": ""}}]}),
        json!([{"role": "assistant"}]),
    ]);
    let hook = MemoryHook::new(store, ctx());

    let mut prompt = "base".to_string();
    let history = hook.hydrate(&mut prompt).await;

    assert!(history.is_empty());
    assert_eq!(prompt, format!("base{CONTEXT_USAGE_INSTRUCTIONS}"));
}

#[tokio::test]
async fn test_initialized_replaces_history_when_turns_exist() {
    // Turns came back but yielded nothing: the starting history is still
    // replaced by the (empty) hydrated one.
    let store = ScriptedStore::with_turns(vec![json!([{"role": "user"}])]);
    let hook = MemoryHook::new(store, ctx());

    let mut messages = vec![ChatMessage::text(Role::User, "seed")];
    let mut prompt = "base".to_string();
    hook.on_agent_initialized(&mut AgentInitializedEvent {
        messages: &mut messages,
        system_prompt: &mut prompt,
    })
    .await;

    assert!(messages.is_empty());
    assert!(prompt.ends_with(CONTEXT_USAGE_INSTRUCTIONS));
}

#[tokio::test]
async fn test_initialized_keeps_history_when_nothing_loaded() {
    for store in [
        ScriptedStore::default(),
        ScriptedStore {
            fail_reads: true,
            ..ScriptedStore::default()
        },
    ] {
        let hook = MemoryHook::new(store, ctx());

        let mut messages = vec![ChatMessage::text(Role::User, "seed")];
        let mut prompt = "base".to_string();
        hook.on_agent_initialized(&mut AgentInitializedEvent {
            messages: &mut messages,
            system_prompt: &mut prompt,
        })
        .await;

        assert_eq!(texts(&messages), [(Role::User, "seed".to_string())]);
        assert_eq!(prompt, "base");
    }
}

#[tokio::test]
async fn test_hydrate_twice_appends_suffix_twice() {
    // Current behavior: every hydration appends the suffix again. A
    // long-lived prompt reused across hydrations grows each time.
    let store = ScriptedStore::with_turns(vec![json!([{"role": "user", "text": "hi"}])]);
    let hook = MemoryHook::new(store, ctx());

    let mut prompt = "base".to_string();
    hook.hydrate(&mut prompt).await;
    hook.hydrate(&mut prompt).await;

    assert_eq!(prompt.matches(CONTEXT_USAGE_INSTRUCTIONS).count(), 2);
}

#[tokio::test]
async fn test_persist_user_and_assistant() {
    let store = Arc::new(ScriptedStore::default());
    let hook = MemoryHook::new(store.clone(), ctx());

    hook.persist(&ChatMessage::text(Role::User, "hello")).await;
    hook.persist(&ChatMessage::text(Role::Assistant, "hi there"))
        .await;

    assert_eq!(
        store.writes(),
        [
            vec![("hello".to_string(), Role::User)],
            vec![("hi there".to_string(), Role::Assistant)],
        ]
    );
}

#[tokio::test]
async fn test_persist_skips_non_conversational_and_textless() {
    let store = Arc::new(ScriptedStore::default());
    let hook = MemoryHook::new(store.clone(), ctx());

    hook.persist(&ChatMessage::text(Role::System, "rules")).await;
    hook.persist(&ChatMessage::text(Role::Tool, "42")).await;
    hook.persist(&ChatMessage {
        role: Role::User,
        content: Vec::new(),
    })
    .await;
    hook.persist(&ChatMessage {
        role: Role::User,
        content: vec![ContentBlock::default(), ContentBlock::text("second")],
    })
    .await;
    hook.persist(&ChatMessage::text(Role::Assistant, "")).await;

    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_persist_failure_is_swallowed() {
    let store = Arc::new(ScriptedStore {
        fail_writes: true,
        ..ScriptedStore::default()
    });
    let hook = MemoryHook::new(store.clone(), ctx());

    hook.persist(&ChatMessage::text(Role::User, "hello")).await;

    assert_eq!(store.writes().len(), 1);
}

#[tokio::test]
async fn test_persist_then_hydrate_round_trip() {
    let store = Arc::new(InMemoryStore::new());
    let hook = MemoryHook::new(store.clone(), ctx());

    hook.persist(&ChatMessage::text(Role::User, "hello")).await;

    let mut prompt = String::new();
    let history = hook.hydrate(&mut prompt).await;

    assert_eq!(history, [ChatMessage::text(Role::User, "hello")]);
}

#[tokio::test]
async fn test_agent_keeps_running_when_memory_is_down() {
    let store = Arc::new(ScriptedStore {
        fail_reads: true,
        fail_writes: true,
        ..ScriptedStore::default()
    });
    let hook: Arc<dyn AgentHook> = Arc::new(MemoryHook::new(store.clone(), ctx()));
    let mut agent = Agent::new(EchoProvider, AgentConfig::default()).with_hook(hook);

    let reply = agent.invoke("hello").await.unwrap();

    assert_eq!(reply, "seen 1 messages");
    assert_eq!(store.writes().len(), 2);
}

#[tokio::test]
async fn test_agent_carries_history_across_invocations() {
    let store = Arc::new(InMemoryStore::new());

    for (i, question) in ["first", "second"].into_iter().enumerate() {
        let hook = Arc::new(MemoryHook::new(store.clone(), ctx()));
        let mut agent = Agent::new(EchoProvider, AgentConfig::default()).with_hook(hook);

        let reply = agent.invoke(question).await.unwrap();

        // Each earlier invocation left a user and an assistant turn behind.
        let prior = i * 2;
        assert_eq!(reply, format!("seen {} messages", prior + 1));
        assert_eq!(
            agent
                .system_prompt()
                .contains(CONTEXT_USAGE_INSTRUCTIONS.trim()),
            i > 0
        );
    }

    assert_eq!(store.turn_count(&ctx()).await, 4);
}

#[tokio::test]
async fn test_hydration_window_is_configurable() {
    let store = Arc::new(InMemoryStore::new());
    for text in ["a", "b", "c"] {
        store
            .save_conversation(&ctx(), &[(text.to_string(), Role::User)])
            .await
            .unwrap();
    }

    let hook = MemoryHook::new(store, ctx()).with_recent_turns(2);
    let mut prompt = String::new();
    let history = hook.hydrate(&mut prompt).await;

    assert_eq!(
        texts(&history),
        [(Role::User, "b".to_string()), (Role::User, "c".to_string())]
    );
}
