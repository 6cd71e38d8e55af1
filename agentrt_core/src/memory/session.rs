use serde::{Deserialize, Serialize};

/// Session id used when the caller does not supply one.
pub const DEFAULT_SESSION_ID: &str = "default-session";

/// Actor id used when the caller does not supply one.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

/// Key of one conversation thread in the memory store.
///
/// Built fresh for every inbound request and never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionContext {
    pub memory_id: String,
    pub actor_id: String,
    pub session_id: String,
}

impl SessionContext {
    #[must_use]
    pub fn new(
        memory_id: impl Into<String>,
        actor_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            memory_id: memory_id.into(),
            actor_id: actor_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl std::fmt::Display for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "memory={} actor={} session={}",
            self.memory_id, self.actor_id, self.session_id
        )
    }
}
