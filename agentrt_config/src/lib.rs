mod schema;

pub use schema::{AgentSettings, Config, MemorySettings, ProviderSettings, resolve_region};
