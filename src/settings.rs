use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::conversation::{SessionLimits, ThinkingDelay};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AssistantSettings {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_sessions: u64,
    pub session_idle_secs: u64,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            min_delay_ms: 300,
            max_delay_ms: 500,
            max_sessions: 10_000,
            session_idle_secs: 30 * 60,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DataSettings {
    /// JSON Lines knowledge file; the built-in knowledge base is used when unset.
    pub knowledge_file: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub assistant: AssistantSettings,
    pub data: DataSettings,
}

impl Settings {
    /// Reads `<name>.toml` (or any format `config` recognizes) if present, then
    /// `ASSISTANT__SECTION__KEY` environment overrides.
    pub fn load(name: &str) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(
                config::Environment::with_prefix("ASSISTANT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.assistant.min_delay_ms > self.assistant.max_delay_ms {
            bail!(
                "assistant.min_delay_ms ({}) exceeds assistant.max_delay_ms ({})",
                self.assistant.min_delay_ms,
                self.assistant.max_delay_ms
            );
        }
        if self.assistant.max_sessions == 0 || self.assistant.session_idle_secs == 0 {
            bail!("assistant.max_sessions and assistant.session_idle_secs must be positive");
        }
        Ok(())
    }

    pub fn thinking_delay(&self) -> ThinkingDelay {
        ThinkingDelay::new(
            Duration::from_millis(self.assistant.min_delay_ms),
            Duration::from_millis(self.assistant.max_delay_ms),
        )
    }

    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            max_sessions: self.assistant.max_sessions,
            idle_timeout: Duration::from_secs(self.assistant.session_idle_secs),
        }
    }
}
