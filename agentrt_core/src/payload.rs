//! Normalization of loosely-typed inbound request payloads.

use serde_json::Value;

use crate::memory::{ANONYMOUS_ACTOR, DEFAULT_SESSION_ID, SessionContext};

/// Keys probed for the user's text, in priority order.
const USER_TEXT_KEYS: [&str; 6] = ["input", "prompt", "inputText", "text", "message", "query"];

fn non_empty_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Extract the user's text from a request payload.
///
/// A bare string is the text itself. For a mapping the first non-empty
/// string under `input`, `prompt`, `inputText`, `text`, `message`, `query`
/// wins. Anything else yields an empty string.
#[must_use]
pub fn extract_user_text(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        Value::Object(_) => USER_TEXT_KEYS
            .iter()
            .find_map(|key| non_empty_str(payload, key))
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// A request payload reduced to what the runtime needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub user_text: String,
    pub session_id: String,
    pub actor_id: String,
}

impl InvocationRequest {
    /// Normalize a payload. Missing or malformed fields fall back to
    /// defaults; this never fails.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            user_text: extract_user_text(payload),
            session_id: non_empty_str(payload, "sessionId")
                .unwrap_or(DEFAULT_SESSION_ID)
                .to_string(),
            actor_id: non_empty_str(payload, "actorId")
                .unwrap_or(ANONYMOUS_ACTOR)
                .to_string(),
        }
    }

    /// Memory key for this request under the given memory resource.
    #[must_use]
    pub fn session_context(&self, memory_id: &str) -> SessionContext {
        SessionContext::new(memory_id, &self.actor_id, &self.session_id)
    }
}
