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

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;
mod runtime;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, InvokeInput,
    InvokeStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "agentrt")]
#[command(about = "Conversational agent runtime with session memory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one request payload and print the response as JSON
    Invoke {
        /// Request payload (JSON or plain text); read from stdin if omitted
        #[arg(short = 'p', long)]
        payload: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,
    },
    /// Start an interactive conversation
    Chat {
        /// Session to resume
        #[arg(short = 's', long)]
        session_id: Option<String>,

        /// Actor the conversation belongs to
        #[arg(short = 'a', long)]
        actor_id: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,
    },
    /// Show the effective configuration
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Invoke { payload, model } => {
            InvokeStrategy
                .execute(InvokeInput { payload, model })
                .await
        }
        Commands::Chat {
            session_id,
            actor_id,
            model,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    session_id,
                    actor_id,
                    model,
                })
                .await
        }
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
