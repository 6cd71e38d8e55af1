mod database;
mod in_memory;

pub use database::DatabaseMemoryStore;
pub use in_memory::InMemoryStore;

use agentrt_core::Role;
use serde_json::{Value, json};

/// Shape one saved turn the way the stores hand it back:
/// `{"messages": [{"role": "user", "content": {"text": "..."}}]}`.
#[must_use]
pub fn turn_payload(messages: &[(String, Role)]) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|(text, role)| {
            json!({
                "role": role.as_str(),
                "content": { "text": text },
            })
        })
        .collect();
    json!({ "messages": messages })
}
