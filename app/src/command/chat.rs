//! Interactive conversation under one session.
//!
//! Every line is a separate invocation with a fresh agent; continuity
//! comes from the memory store, exactly as for remote callers.

use serde_json::json;
use std::io::Write;
use tracing::info;
use uuid::Uuid;

use super::init_runtime;
use crate::runtime::Status;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Session to resume (a new one is generated if not provided)
    pub session_id: Option<String>,
    /// Actor the conversation belongs to
    pub actor_id: Option<String>,
    /// Optional model override
    pub model: Option<String>,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let runtime = init_runtime(input.model).await?;

        let session_id = input
            .session_id
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        let actor_id = input
            .actor_id
            .unwrap_or_else(|| agentrt_core::memory::ANONYMOUS_ACTOR.to_string());

        if !runtime.config().memory.enabled() {
            println!("Memory is disabled; set MEMORY_ID to keep context between turns.");
        }
        println!("=== Conversation Session: {session_id} ===");
        println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

        let mut turns = 0_usize;
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();

            if matches!(line, "exit" | "quit" | "q") {
                break;
            }
            if line.is_empty() {
                continue;
            }

            let response = runtime
                .invoke(&json!({
                    "input": line,
                    "sessionId": &session_id,
                    "actorId": &actor_id,
                }))
                .await;

            match response.status {
                Status::Success => {
                    turns += 1;
                    println!("\n{}\n", response.response);
                }
                Status::Error => eprintln!("Error: {}", response.response),
            }
        }

        println!("\nSession ended. Total turns: {turns}");
        info!("Conversation {session_id} ended after {turns} turns");
        Ok(())
    }
}
