use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmBackend,
    #[serde(default)]
    pub device_serial: Option<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_groups_file")]
    pub groups_file: PathBuf,
    #[serde(default)]
    pub monitor: MonitorSettings,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_groups_file() -> PathBuf {
    PathBuf::from("groups.json")
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum LlmBackend {
    #[serde(rename = "gemini")]
    Gemini { model: String },
    #[serde(rename = "openai")]
    OpenAi { endpoint: String, model: String },
}

impl LlmBackend {
    /// API keys never live in the config file.
    pub fn api_key(&self) -> Option<String> {
        let var = match self {
            LlmBackend::Gemini { .. } => "GEMINI_API_KEY",
            LlmBackend::OpenAi { .. } => "LLM_API_KEY",
        };
        std::env::var(var).ok().filter(|k| !k.is_empty())
    }

    pub fn model(&self) -> &str {
        match self {
            LlmBackend::Gemini { model } => model,
            LlmBackend::OpenAi { model, .. } => model,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorSettings {
    pub duration_secs: u64,
    pub interval_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            duration_secs: 5 * 60,
            interval_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmBackend::Gemini {
                model: "gemini-2.5-flash".to_string(),
            },
            device_serial: None,
            data_dir: default_data_dir(),
            groups_file: default_groups_file(),
            monitor: MonitorSettings::default(),
        }
    }
}

impl Config {
    pub fn exists() -> bool {
        std::path::Path::new(CONFIG_PATH).exists()
    }

    pub fn load() -> Result<Self> {
        let content =
            std::fs::read_to_string(CONFIG_PATH).context("Failed to read config.toml")?;
        toml::from_str(&content).context("Failed to parse config.toml")
    }

    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(CONFIG_PATH, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if matches!(self.llm, LlmBackend::Gemini { .. }) && self.api_key_missing() {
            anyhow::bail!("GEMINI_API_KEY is not set");
        }
        Ok(())
    }

    fn api_key_missing(&self) -> bool {
        self.llm.api_key().is_none()
    }
}
