use serde_json::Value;
use std::io::Read;

use super::init_runtime;

/// Input parameters for the Invoke command strategy.
#[derive(Debug, Clone)]
pub struct InvokeInput {
    /// Request payload; read from stdin when absent
    pub payload: Option<String>,
    /// Optional model override
    pub model: Option<String>,
}

/// Strategy for handling a single request payload.
///
/// Prints the invocation response as JSON on stdout; logs go to stderr.
#[derive(Debug, Clone, Copy)]
pub struct InvokeStrategy;

/// Parse raw input as JSON, falling back to treating it as plain text.
fn parse_payload(raw: &str) -> Value {
    let raw = raw.trim();
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

impl super::CommandStrategy for InvokeStrategy {
    type Input = InvokeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let raw = match input.payload {
            Some(payload) => payload,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        let runtime = init_runtime(input.model).await?;
        let response = runtime.invoke(&parse_payload(&raw)).await;

        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}
