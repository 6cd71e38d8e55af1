#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod hook;
mod store;

// Re-export MemoryStore so callers can name the trait without agentrt_core
pub use agentrt_core::MemoryStore;

pub use hook::{CONTEXT_USAGE_INSTRUCTIONS, DEFAULT_RECENT_TURNS, MemoryHook};
pub use store::{DatabaseMemoryStore, InMemoryStore, turn_payload};
