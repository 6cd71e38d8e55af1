//! Contracts for the external conversation store and the shapes it returns.

mod session;
mod store;
pub mod turn;

pub use session::{ANONYMOUS_ACTOR, DEFAULT_SESSION_ID, SessionContext};
pub use store::MemoryStore;
pub use turn::{StoredContent, StoredTurn, flatten_turns, normalize_message};
