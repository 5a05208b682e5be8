use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{AppConfig, ProvidersConfig};
use crate::ui::Output;

const CONFIG_TEMPLATE: &str = r#"# betpredict configuration
# LLM service, referenced from providers.toml
llm = "google.llm"

# Generation
temperature = 0.7
search_grounding = true
timeout_secs = 90

# Display
analysis_preview_chars = 600
source_title_chars = 15

# Chat transcript (default: history.json next to this file)
# history_path = "/path/to/history.json"

[retry]
max_attempts = 3
base_delay_ms = 1000
"#;

const PROVIDERS_TEMPLATE: &str = r#"# betpredict providers
# api_key may be left empty and supplied through GEMINI_API_KEY instead

[google]
name = "Google AI Studio"
api_key = ""

  [google.llm]
  type = "llm"
  base_url = "https://generativelanguage.googleapis.com/v1beta"
  model = "gemini-3-pro-preview"
"#;

/// Write config templates for the chosen scope; existing files are left alone
pub fn initialize(local: bool) -> Result<()> {
    let output = Output::new();
    let config_dir = AppConfig::get_dir(local);
    let config_path = config_dir.join("config.toml");
    let providers_path = ProvidersConfig::config_path();
    let location = AppConfig::get_scope_name(local, !local);

    write_template(&output, &providers_path, "providers config", PROVIDERS_TEMPLATE)?;
    write_template(&output, &config_path, "config", CONFIG_TEMPLATE)?;

    // sanity check what is now on disk
    let config = AppConfig::load_with_scope(local, !local)?;
    let providers = ProvidersConfig::load()?;
    let service = config.resolve_llm(&providers)?;

    if service.api_key.trim().is_empty() {
        output.note("No API key set yet");
        output.info(&format!(
            "Edit {} or export GEMINI_API_KEY",
            providers_path.display()
        ));
    }

    output.finish("initialization", location);

    Ok(())
}

fn write_template(output: &Output, path: &Path, resource: &str, content: &str) -> Result<()> {
    if path.exists() {
        output.resource_action("Found", resource, path);
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}: {}", resource, path.display()))?;
    output.resource_action("Creating", resource, path);

    Ok(())
}
