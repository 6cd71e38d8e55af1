//! Normalization of stored turns into live-history messages.
//!
//! The memory service does not return a uniform payload. A turn may be a
//! mapping with a `messages` list or the list itself, and a message body
//! may be nested three different ways. Each known shape gets a variant;
//! anything else is skipped rather than guessed at.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{ChatMessage, Role};

/// One turn as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredTurn {
    /// `{"messages": [...]}`
    Wrapped(Vec<Value>),
    /// `[...]`
    Bare(Vec<Value>),
    Unrecognized(Value),
}

impl From<Value> for StoredTurn {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(list) => Self::Bare(list),
            Value::Object(mut map) => match map.remove("messages") {
                Some(Value::Array(list)) => Self::Wrapped(list),
                Some(other) => {
                    map.insert("messages".to_string(), other);
                    Self::Unrecognized(Value::Object(map))
                }
                None => Self::Unrecognized(Value::Object(map)),
            },
            other => Self::Unrecognized(other),
        }
    }
}

/// Where a stored message keeps its text.
///
/// The `content` field decides the shape; the top-level `text` field is
/// only consulted when `content` is neither an object nor a non-empty list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoredContent<'a> {
    /// `{"content": {"text": "..."}}`
    Block(&'a Map<String, Value>),
    /// `{"content": [{"text": "..."}, ...]}`
    Blocks(&'a [Value]),
    /// `{"text": "..."}`
    Direct(&'a str),
    Missing,
}

impl<'a> StoredContent<'a> {
    #[must_use]
    pub fn of(message: &'a Map<String, Value>) -> Self {
        match message.get("content") {
            Some(Value::Object(block)) => Self::Block(block),
            Some(Value::Array(blocks)) if !blocks.is_empty() => Self::Blocks(blocks),
            _ => match message.get("text") {
                Some(Value::String(text)) => Self::Direct(text),
                _ => Self::Missing,
            },
        }
    }

    /// Resolved text, or `None` when absent or empty.
    #[must_use]
    pub fn text(self) -> Option<&'a str> {
        let text = match self {
            Self::Block(block) => block.get("text").and_then(Value::as_str),
            Self::Blocks(blocks) => blocks
                .first()
                .and_then(Value::as_object)
                .and_then(|first| first.get("text"))
                .and_then(Value::as_str),
            Self::Direct(text) => Some(text),
            Self::Missing => None,
        };
        text.filter(|t| !t.is_empty())
    }
}

/// Resolve the role of a stored message.
///
/// The first of `role` and `type` holding a non-empty value decides, even
/// when that value is not a string. Anything other than the literal
/// `assistant`, including system and tool roles, becomes `user`.
fn resolve_role(message: &Map<String, Value>) -> Role {
    let raw = ["role", "type"]
        .iter()
        .find_map(|key| message.get(*key).filter(|v| is_present(v)));

    match raw {
        Some(Value::String(role)) if role == "assistant" => Role::Assistant,
        _ => Role::User,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(list) => !list.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Map one stored message to a single-block [`ChatMessage`].
///
/// Returns `None` for non-object values and for messages without text.
#[must_use]
pub fn normalize_message(value: &Value) -> Option<ChatMessage> {
    let message = value.as_object()?;
    let text = StoredContent::of(message).text()?;
    Some(ChatMessage::text(resolve_role(message), text))
}

/// Flatten turns into one ordered history.
///
/// Order is the store's turn order, then message order within each turn.
/// Unrecognized turns and unreadable messages are skipped without
/// affecting their siblings.
#[must_use]
pub fn flatten_turns(turns: Vec<Value>) -> Vec<ChatMessage> {
    let mut history = Vec::new();

    for turn in turns {
        let messages = match StoredTurn::from(turn) {
            StoredTurn::Wrapped(list) | StoredTurn::Bare(list) => list,
            StoredTurn::Unrecognized(other) => {
                warn!("Skipping turn with unexpected shape: {other}");
                continue;
            }
        };

        for raw in &messages {
            match normalize_message(raw) {
                Some(message) => history.push(message),
                None => debug!("Skipping stored message without text: {raw}"),
            }
        }
    }

    history
}
