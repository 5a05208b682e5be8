use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::providers::{ProvidersConfig, ResolvedService};
use crate::llm::GenerationSettings;
use crate::prediction::RetryPolicy;

const DIR_NAME: &str = ".betpredict";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Auto,
    Local,
    Global,
}

/// Retry behaviour around each model call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Attempts per query, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the second attempt; doubles after each failure (default: 1000)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// LLM service reference into providers.toml (e.g. "google.llm")
    pub llm: String,

    /// Sampling temperature (default: 0.7)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Attach the Google Search tool to every request (default: true)
    #[serde(default = "default_search_grounding")]
    pub search_grounding: bool,

    /// Per-attempt HTTP timeout in seconds (default: 90)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Characters of analysis prose shown per prediction (default: 600)
    #[serde(default = "default_analysis_preview_chars")]
    pub analysis_preview_chars: usize,

    /// Characters of each source title shown (default: 15)
    #[serde(default = "default_source_title_chars")]
    pub source_title_chars: usize,

    /// Chat transcript file (default: <config dir>/history.json)
    pub history_path: Option<PathBuf>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_search_grounding() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_analysis_preview_chars() -> usize {
    600
}

fn default_source_title_chars() -> usize {
    15
}

impl AppConfig {
    /// ~/.betpredict/
    pub fn global_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DIR_NAME)
    }

    /// ./.betpredict/
    pub fn local_dir() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DIR_NAME)
    }

    /// A local config in the home directory itself is the global one
    pub fn has_local_config() -> bool {
        let current_dir = match std::env::current_dir() {
            Ok(dir) => dir,
            Err(_) => return false,
        };

        if let Some(home) = Self::global_dir().parent().map(Path::to_path_buf) {
            let current_canonical = current_dir.canonicalize().unwrap_or(current_dir.clone());
            let home_canonical = home.canonicalize().unwrap_or(home);

            if current_canonical == home_canonical {
                return false;
            }
        }

        Self::local_dir().join("config.toml").exists()
    }

    /// `--local` and `--global` are mutually exclusive
    pub fn validate_scope_flags(local: bool, global: bool) -> Result<()> {
        if local && global {
            anyhow::bail!("Cannot specify both --local and --global, please choose one");
        }
        Ok(())
    }

    /// "local" or "global"
    pub fn get_scope_name(force_local: bool, force_global: bool) -> &'static str {
        if force_local {
            "local"
        } else if force_global {
            "global"
        } else if Self::has_local_config() {
            "local"
        } else {
            "global"
        }
    }

    /// Config directory for `init`
    /// Format: "./.betpredict" (local) or "~/.betpredict" (global)
    pub fn get_dir(local: bool) -> PathBuf {
        if local {
            Self::local_dir()
        } else {
            Self::global_dir()
        }
    }

    /// Load by flag, or local before global when neither is given
    pub fn load_with_scope(force_local: bool, force_global: bool) -> Result<Self> {
        Self::validate_scope_flags(force_local, force_global)?;

        let scope = if force_local {
            ConfigScope::Local
        } else if force_global {
            ConfigScope::Global
        } else {
            ConfigScope::Auto
        };

        match scope {
            ConfigScope::Auto => {
                if Self::has_local_config() {
                    Self::load_from_path(&Self::local_dir().join("config.toml"), true)
                } else {
                    Self::load_from_path(&Self::global_dir().join("config.toml"), false)
                }
            }
            ConfigScope::Local => Self::load_from_path(&Self::local_dir().join("config.toml"), true),
            ConfigScope::Global => {
                Self::load_from_path(&Self::global_dir().join("config.toml"), false)
            }
        }
    }

    fn load_from_path(path: &Path, is_local: bool) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration not found at: {}\nRun `betpredict init` to create it",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        // local scope keeps its own transcript
        if is_local && config.history_path.is_none() {
            config.history_path = Some(Self::local_dir().join("history.json"));
        }

        tracing::debug!("Loaded app config from: {}", path.display());
        tracing::debug!("LLM: {}", config.llm);

        Ok(config)
    }

    /// Parse config.toml content; missing optional keys take their defaults
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Transcript file; falls back to ~/.betpredict/history.json
    pub fn get_history_path(&self) -> PathBuf {
        self.history_path
            .clone()
            .unwrap_or_else(|| Self::global_dir().join("history.json"))
    }

    /// Look up the `llm` reference in providers.toml
    pub fn resolve_llm(&self, providers: &ProvidersConfig) -> Result<ResolvedService> {
        providers
            .get_service(&self.llm)
            .with_context(|| format!("Failed to resolve LLM service: {}", self.llm))
    }

    /// Retry settings as a [`RetryPolicy`] (attempts floored at 1)
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
        )
    }

    /// Per-request generation settings for the model client
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.temperature,
            search_grounding: self.search_grounding,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_app_config() {
        let toml_str = r#"
llm = "google.llm"
temperature = 0.4
search_grounding = false
timeout_secs = 30
analysis_preview_chars = 300
history_path = "/tmp/betpredict/history.json"

[retry]
max_attempts = 5
base_delay_ms = 250
        "#;

        let config = AppConfig::parse(toml_str).unwrap();

        assert_eq!(config.llm, "google.llm");
        assert_eq!(config.temperature, 0.4);
        assert!(!config.search_grounding);
        assert_eq!(config.analysis_preview_chars, 300);
        assert_eq!(
            config.get_history_path(),
            PathBuf::from("/tmp/betpredict/history.json")
        );

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));

        let settings = config.generation_settings();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert!(!settings.search_grounding);
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::parse(r#"llm = "google.llm""#).unwrap();

        assert_eq!(config.temperature, 0.7);
        assert!(config.search_grounding);
        assert_eq!(config.timeout_secs, 90);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.analysis_preview_chars, 600);
        assert_eq!(config.source_title_chars, 15);
        assert_eq!(
            config.get_history_path(),
            AppConfig::global_dir().join("history.json")
        );
    }

    #[test]
    fn test_missing_llm_reference_is_an_error() {
        assert!(AppConfig::parse("temperature = 0.2").is_err());
    }

    #[test]
    fn test_both_scope_flags_rejected() {
        assert!(AppConfig::validate_scope_flags(true, true).is_err());
        assert!(AppConfig::validate_scope_flags(true, false).is_ok());
    }
}
