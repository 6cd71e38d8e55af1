use agentrt_core::util::DEFAULT_SYSTEM_PROMPT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Region used when neither the file nor the environment names one.
const FALLBACK_REGION: &str = "us-east-1";

/// Runtime configuration, built once at start-up and passed down.
///
/// Values come from `~/agentrt/config.json` when present, then from the
/// environment, which always wins.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub memory: MemorySettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentSettings {
    #[serde(default = "AgentSettings::default_model")]
    pub model: String,
    /// Operator-supplied instruction, set by `AGENT_INSTRUCTION`.
    #[serde(default = "AgentSettings::default_instruction")]
    pub instruction: String,
    /// Optional persona prompt placed ahead of the instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            instruction: Self::default_instruction(),
            system_prompt: None,
        }
    }
}

impl AgentSettings {
    fn default_model() -> String {
        "anthropic.claude-3-5-sonnet-20240620-v1:0".to_string()
    }

    fn default_instruction() -> String {
        DEFAULT_SYSTEM_PROMPT.to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProviderSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MemorySettings {
    /// Memory resource id. Empty disables conversation memory.
    #[serde(default)]
    pub memory_id: String,
    /// Turns loaded when an agent starts.
    #[serde(default = "MemorySettings::default_recent_turns")]
    pub recent_turns: usize,
    /// Durable store; without it memory lives only as long as the process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            memory_id: String::new(),
            recent_turns: Self::default_recent_turns(),
            database_url: None,
        }
    }
}

impl MemorySettings {
    const fn default_recent_turns() -> usize {
        5
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.memory_id.is_empty()
    }
}

/// Pick the region: `AWS_REGION`, then `AWS_DEFAULT_REGION`, then the
/// configured value, then `us-east-1`.
pub fn resolve_region<F>(configured: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["AWS_REGION", "AWS_DEFAULT_REGION"]
        .iter()
        .find_map(|key| lookup(*key).filter(|v| !v.is_empty()))
        .or_else(|| configured.filter(|v| !v.is_empty()).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_REGION.to_string())
}

impl Config {
    /// Load the file (if any) and apply process environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        let base = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = serde_json::from_str(&content)?;
            info!("Loaded config from {}", config_path.display());
            config
        } else {
            info!(
                "No config file at {}, using defaults and environment",
                config_path.display()
            );
            Self::default()
        };

        Ok(base.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply environment-style overrides from any key lookup.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(model) = get("FOUNDATION_MODEL") {
            self.agent.model = model;
        }
        if let Some(instruction) = get("AGENT_INSTRUCTION") {
            self.agent.instruction = instruction;
        }
        if let Some(memory_id) = get("MEMORY_ID") {
            self.memory.memory_id = memory_id;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.memory.database_url = Some(url);
        }
        if let Some(api_key) = get("PROVIDER_API_KEY") {
            self.provider.api_key = api_key;
        }
        if let Some(base_url) = get("PROVIDER_BASE_URL") {
            self.provider.base_url = Some(base_url);
        }

        self.region = Some(resolve_region(self.region.as_deref(), &lookup));
        self
    }

    /// Effective region, resolved during loading.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(FALLBACK_REGION)
    }

    /// System prompt handed to every new agent.
    #[must_use]
    pub fn system_prompt(&self) -> String {
        match &self.agent.system_prompt {
            Some(persona) if !persona.is_empty() => format!(
                "{persona}\n\n## Available Information\n\n{}",
                self.agent.instruction
            ),
            _ => self.agent.instruction.clone(),
        }
    }

    fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("agentrt"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "agent": {
    "model": "anthropic.claude-3-5-sonnet-20240620-v1:0",
    "instruction": "You are a helpful assistant."
  },
  "provider": {
    "api_key": "your-api-key-here",
    "base_url": "https://api.openai.com/v1"
  },
  "memory": {
    "memory_id": "",
    "recent_turns": 5,
    "database_url": "sqlite://agentrt-memory.db?mode=rwc"
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("   1. Add your provider API key");
        println!("   2. Set memory.memory_id (or MEMORY_ID) to enable conversation memory");
        println!("   3. Run 'agentrt chat' to start a conversation");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::default().with_overrides(env(&[]));
        assert_eq!(
            config.agent.model,
            "anthropic.claude-3-5-sonnet-20240620-v1:0"
        );
        assert_eq!(config.agent.instruction, "You are a helpful assistant.");
        assert!(!config.memory.enabled());
        assert_eq!(config.memory.recent_turns, 5);
        assert_eq!(config.region(), "us-east-1");
    }

    #[test]
    fn environment_overrides_file() {
        let file: Config = serde_json::from_str(
            r#"{"agent": {"model": "from-file"}, "memory": {"memory_id": "file-mem"}}"#,
        )
        .unwrap();

        let config = file.with_overrides(env(&[
            ("FOUNDATION_MODEL", "from-env"),
            ("MEMORY_ID", "env-mem"),
            ("AGENT_INSTRUCTION", "Answer about projects."),
            ("PROVIDER_API_KEY", "sk-test"),
        ]));

        assert_eq!(config.agent.model, "from-env");
        assert_eq!(config.memory.memory_id, "env-mem");
        assert!(config.memory.enabled());
        assert_eq!(config.agent.instruction, "Answer about projects.");
        assert_eq!(config.provider.api_key, "sk-test");
    }

    #[test]
    fn empty_environment_values_are_ignored() {
        let config = Config::default().with_overrides(env(&[("MEMORY_ID", "")]));
        assert!(!config.memory.enabled());
    }

    #[test]
    fn region_precedence() {
        let lookup = env(&[("AWS_REGION", "eu-west-1"), ("AWS_DEFAULT_REGION", "us-west-2")]);
        assert_eq!(resolve_region(None, &lookup), "eu-west-1");

        let lookup = env(&[("AWS_DEFAULT_REGION", "us-west-2")]);
        assert_eq!(resolve_region(Some("ap-south-1"), &lookup), "us-west-2");

        assert_eq!(resolve_region(Some("ap-south-1"), env(&[])), "ap-south-1");
        assert_eq!(resolve_region(None, env(&[])), "us-east-1");
    }

    #[test]
    fn system_prompt_composition() {
        let mut config = Config::default();
        assert_eq!(config.system_prompt(), "You are a helpful assistant.");

        config.agent.system_prompt = Some("You are a portfolio guide.".to_string());
        config.agent.instruction = "Projects: jamcam.".to_string();
        assert_eq!(
            config.system_prompt(),
            "You are a portfolio guide.\n\n## Available Information\n\nProjects: jamcam."
        );
    }
}
