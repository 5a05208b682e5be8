use tokio::sync::watch;

use crate::llm::{build_prompt, parse_structured, ModelInvoker};
use crate::prediction::{assemble, PredictError, PredictionResult, RetryPolicy};

/// The prediction client: prompt, model call with retries, parse, assemble.
///
/// Holds no per-request state, so one instance can serve concurrent queries.
pub struct Predictor {
    invoker: Box<dyn ModelInvoker>,
    policy: RetryPolicy,
}

impl Predictor {
    pub fn new(invoker: Box<dyn ModelInvoker>, policy: RetryPolicy) -> Self {
        Self { invoker, policy }
    }

    pub fn model(&self) -> &str {
        self.invoker.model()
    }

    pub async fn get_prediction(&self, query: &str) -> Result<PredictionResult, PredictError> {
        self.get_prediction_with_cancel(query, None).await
    }

    /// Same as [`Predictor::get_prediction`], giving up between attempts once `cancel` reads true
    pub async fn get_prediction_with_cancel(
        &self,
        query: &str,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Result<PredictionResult, PredictError> {
        if query.trim().is_empty() {
            return Err(PredictError::EmptyQuery);
        }

        let prompt = build_prompt(query);
        tracing::debug!("Built prompt ({} chars) for query: {}", prompt.len(), query);

        let invoker = &self.invoker;
        let prompt = prompt.as_str();
        let raw = self
            .policy
            .run(
                move |attempt| async move {
                    tracing::debug!("Prediction attempt {} with model {}", attempt + 1, invoker.model());
                    invoker.generate(prompt).await
                },
                cancel,
            )
            .await?;

        let parsed = parse_structured(&raw.text);
        if parsed.is_none() {
            tracing::warn!("No structured data in model output; using defaults");
        }

        Ok(assemble(parsed.as_ref(), &raw.citations, &raw.text))
    }
}
