//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, so every
//! call is monomorphized and nothing is boxed.

use agentrt_config::Config;
use tracing::info;

use crate::runtime::Runtime;

mod chat;
mod info;
mod init;
mod invoke;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use invoke::{InvokeInput, InvokeStrategy};
pub use version::VersionStrategy;

/// Load configuration, apply a model override and build the runtime.
async fn init_runtime(model: Option<String>) -> anyhow::Result<Runtime> {
    let mut config = Config::load()?;
    if let Some(model) = model {
        info!("Model override from command line: {model}");
        config.agent.model = model;
    }
    Ok(Runtime::from_config(config).await)
}

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust,ignore
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
