use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors surfaced by an agent invocation.
///
/// Memory failures never appear here: hooks log and swallow them.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Model provider error: {0:#}")]
    Provider(#[from] anyhow::Error),

    #[error("Empty response from model")]
    EmptyResponse,
}
