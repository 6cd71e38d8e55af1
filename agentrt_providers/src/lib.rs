#![deny(
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

mod chat_completions;
mod error;
mod retry;

pub use chat_completions::ChatCompletionsProvider;
pub use error::ProviderError;
pub use retry::{RetryPolicy, retry_with_backoff};
