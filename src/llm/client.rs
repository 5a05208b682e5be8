use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ResolvedService;
use crate::prediction::PredictError;

/// Web source the search tool attached to an answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Citation {
    pub title: Option<String>,
    pub uri: Option<String>,
}

/// Free-form model output plus its grounding citations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Sends one prompt to a generative model.
///
/// Repeated calls may return different text; no local state is mutated.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<RawResponse, PredictError>;

    fn model(&self) -> &str;
}

/// Generation settings that do not come from providers.toml
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub search_grounding: bool,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            search_grounding: true,
            timeout: Duration::from_secs(90),
        }
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    settings: GenerationSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        settings: GenerationSettings,
    ) -> Result<Self, PredictError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| PredictError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            "Created GeminiClient: model={}, search_grounding={}, base_url={}",
            model,
            settings.search_grounding,
            base_url
        );

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        })
    }

    /// Build from a service resolved out of providers.toml
    pub fn from_resolved(
        resolved: &ResolvedService,
        settings: GenerationSettings,
    ) -> Result<Self, PredictError> {
        Self::new(
            resolved.api_key.clone(),
            resolved.model.clone(),
            resolved.base_url.clone(),
            settings,
        )
    }

    fn build_request(&self, prompt: &str) -> GenerateRequest {
        let tools = if self.settings.search_grounding {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            tools,
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
            },
        }
    }
}

#[async_trait]
impl ModelInvoker for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<RawResponse, PredictError> {
        let request = self.build_request(prompt);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!("Sending generateContent request: {} ({} chars)", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PredictError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PredictError::Transport(e.to_string()))?;

        let raw = classify_response(status, &body)?;

        tracing::debug!(
            "Gemini response: {} chars, {} citations",
            raw.text.len(),
            raw.citations.len()
        );

        Ok(raw)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Map an HTTP status and body to a result.
///
/// Non-2xx statuses and undecodable 2xx bodies are both `Service` errors.
fn classify_response(status: StatusCode, body: &str) -> Result<RawResponse, PredictError> {
    if !status.is_success() {
        tracing::error!("Gemini API error ({}): {}", status, body);
        return Err(PredictError::Service {
            status: status.as_u16(),
            message: body.to_string(),
        });
    }

    decode_response(body).map_err(|e| {
        tracing::error!("Failed to decode Gemini response: {}", e);
        PredictError::Service {
            status: status.as_u16(),
            message: format!("undecodable response body: {}", e),
        }
    })
}

/// Decode the response envelope; only the first candidate is used.
///
/// An empty candidate list yields empty text rather than an error.
fn decode_response(body: &str) -> serde_json::Result<RawResponse> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        tracing::warn!("Gemini response has no candidates");
        return Ok(RawResponse::default());
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let citations = candidate
        .grounding_metadata
        .map(|m| {
            m.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .map(|web| Citation {
                    title: web.title,
                    uri: web.uri,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(RawResponse { text, citations })
}
