use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::generate::DEFAULT_PROMPT_TRANSCRIPT_CHARS;
use crate::synthesize::CharBudgets;
use crate::BlogLength;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// LLM model; names starting with `claude` use the Anthropic API
    pub model: String,
    /// Caption language preference for transcripts
    pub lang: String,
    /// Applies to every outbound HTTP request
    pub request_timeout_secs: u64,
    pub ai_transcript_chars: usize,
    pub fallback_short_chars: Option<usize>,
    pub fallback_medium_chars: Option<usize>,
    pub fallback_long_chars: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            model: "gpt-4o".to_string(),
            lang: "en".to_string(),
            request_timeout_secs: 60,
            ai_transcript_chars: DEFAULT_PROMPT_TRANSCRIPT_CHARS,
            fallback_short_chars: BlogLength::Short.fallback_char_budget(),
            fallback_medium_chars: BlogLength::Medium.fallback_char_budget(),
            fallback_long_chars: BlogLength::Long.fallback_char_budget(),
        }
    }
}

impl Config {
    /// Load config from ~/.config/ytblog/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn char_budgets(&self) -> CharBudgets {
        CharBudgets {
            short: self.fallback_short_chars,
            medium: self.fallback_medium_chars,
            long: self.fallback_long_chars,
        }
    }

    /// Shared HTTP client with the configured timeout
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()
            .wrap_err("failed to build HTTP client")
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytblog")
        .join("config.toml")
}
