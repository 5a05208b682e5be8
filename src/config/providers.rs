use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::AppConfig;

/// Service kind; only generative LLM services are used here
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Llm,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(flatten)]
    pub services: HashMap<String, ServiceConfig>,
}

/// Contents of providers.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(flatten)]
    providers: HashMap<String, ProviderConfig>,
}

impl ProvidersConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            anyhow::bail!(
                "Providers configuration not found at: {}\nRun `betpredict init` to create a template",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read providers config: {}", config_path.display())
        })?;

        let config = Self::parse(&content).with_context(|| {
            format!(
                "Failed to parse providers config: {}",
                config_path.display()
            )
        })?;

        tracing::debug!("Loaded providers config from: {}", config_path.display());
        tracing::debug!(
            "Available providers: {:?}",
            config.providers.keys().collect::<Vec<_>>()
        );

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// providers.toml always lives in the global directory
    pub fn config_path() -> PathBuf {
        AppConfig::global_dir().join("providers.toml")
    }

    /// Resolve a service reference such as "google.llm"
    pub fn get_service(&self, reference: &str) -> Result<ResolvedService> {
        let Some((provider_name, service_name)) = reference.split_once('.') else {
            anyhow::bail!(
                "Invalid service reference: '{}'. Expected format: 'provider.service' (e.g., 'google.llm')",
                reference
            );
        };

        let provider = self
            .providers
            .get(provider_name)
            .with_context(|| format!("Provider '{}' not found in providers.toml", provider_name))?;

        let service = provider.services.get(service_name).with_context(|| {
            format!(
                "Service '{}' not found in provider '{}'",
                service_name, provider_name
            )
        })?;

        Ok(ResolvedService {
            provider_name: provider_name.to_string(),
            api_key: provider.api_key.clone(),
            base_url: service.base_url.clone(),
            model: service.model.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedService {
    pub provider_name: String,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ResolvedService {
    /// A key given on the command line or in the environment wins over providers.toml
    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        self
    }

    pub fn ensure_api_key(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!(
                "No API key configured for provider '{}'. Set api_key in {} or GEMINI_API_KEY",
                self.provider_name,
                ProvidersConfig::config_path().display()
            );
        }
        Ok(())
    }
}
