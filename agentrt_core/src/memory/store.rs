use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::SessionContext;
use crate::Role;

/// An external, session-scoped, append-only conversation log.
///
/// Turns come back loosely typed: a mapping with a `messages` list or a
/// bare list of message mappings. Callers normalize them with
/// [`flatten_turns`](super::flatten_turns).
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Fetch up to `k` of the most recent turns for the session.
    async fn get_last_k_turns(&self, ctx: &SessionContext, k: usize)
    -> anyhow::Result<Vec<Value>>;

    /// Append one turn made of `(text, role)` pairs.
    async fn save_conversation(
        &self,
        ctx: &SessionContext,
        messages: &[(String, Role)],
    ) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: MemoryStore + ?Sized> MemoryStore for Arc<T> {
    async fn get_last_k_turns(
        &self,
        ctx: &SessionContext,
        k: usize,
    ) -> anyhow::Result<Vec<Value>> {
        (**self).get_last_k_turns(ctx, k).await
    }

    async fn save_conversation(
        &self,
        ctx: &SessionContext,
        messages: &[(String, Role)],
    ) -> anyhow::Result<()> {
        (**self).save_conversation(ctx, messages).await
    }
}
