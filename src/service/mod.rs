pub mod ask;
pub mod chat;
pub mod history;
pub mod init;
pub mod predict;

use anyhow::{Context, Result};

use crate::config::{AppConfig, ProvidersConfig};
use crate::llm::GeminiClient;
use crate::ui::DisplayOptions;
use predict::Predictor;

/// Everything a command needs to issue predictions
pub(crate) struct Session {
    pub config: AppConfig,
    pub predictor: Predictor,
    pub display: DisplayOptions,
}

impl Session {
    pub fn open(api_key: Option<String>, force_local: bool, force_global: bool) -> Result<Self> {
        let config = AppConfig::load_with_scope(force_local, force_global)?;
        let providers = ProvidersConfig::load()?;

        let service = config
            .resolve_llm(&providers)?
            .with_api_key_override(api_key);
        service.ensure_api_key()?;

        let client = GeminiClient::from_resolved(&service, config.generation_settings())
            .context("Failed to create model client")?;
        let predictor = Predictor::new(Box::new(client), config.retry_policy());

        let display = DisplayOptions::from_config(&config);

        Ok(Self {
            config,
            predictor,
            display,
        })
    }
}
