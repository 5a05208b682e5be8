use anyhow::{Context, Result};

use super::Session;
use crate::ui::Output;

/// One-shot prediction for a single query
pub async fn ask(
    query: &str,
    json: bool,
    api_key: Option<String>,
    force_local: bool,
    force_global: bool,
) -> Result<()> {
    let output = Output::new();
    let session = Session::open(api_key, force_local, force_global)?;

    output.status("Analyzing", query);
    output.note(&format!("model {}", session.predictor.model()));

    let prediction = session
        .predictor
        .get_prediction(query)
        .await
        .with_context(|| format!("Failed to get prediction for: {}", query))?;

    if json {
        let content = serde_json::to_string_pretty(&prediction)
            .context("Failed to serialize prediction")?;
        println!("{}", content);
    } else {
        output.prediction(&prediction, &session.display);
    }

    Ok(())
}
