use agentrt_core::{MemoryStore, Role, SessionContext};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::turn_payload;

/// Process-local conversation log.
///
/// Each `save_conversation` call becomes one turn. History does not
/// outlive the process, and nothing is ever evicted: the map grows with
/// every session and turn, so it suits short-lived processes only.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    turns: RwLock<HashMap<SessionContext, Vec<Value>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of turns stored for a session.
    pub async fn turn_count(&self, ctx: &SessionContext) -> usize {
        self.turns.read().await.get(ctx).map_or(0, Vec::len)
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn get_last_k_turns(
        &self,
        ctx: &SessionContext,
        k: usize,
    ) -> anyhow::Result<Vec<Value>> {
        let turns = self.turns.read().await;
        let Some(session) = turns.get(ctx) else {
            return Ok(Vec::new());
        };

        let start = session.len().saturating_sub(k);
        Ok(session[start..].to_vec())
    }

    async fn save_conversation(
        &self,
        ctx: &SessionContext,
        messages: &[(String, Role)],
    ) -> anyhow::Result<()> {
        self.turns
            .write()
            .await
            .entry(ctx.clone())
            .or_default()
            .push(turn_payload(messages));
        debug!("Stored turn for {ctx}");
        Ok(())
    }
}
