use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::prediction::PredictionResult;

pub const GREETING: &str = "👋 Welcome to BetPredict AI Bot!\n\nSend me any football match (e.g., 'Real Madrid vs Liverpool') or use the /menu for quick options.";

pub const APOLOGY: &str =
    "❌ Sorry, I couldn't process that request. Please try again with a clear match name.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat bubble in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Millisecond timestamp of creation, as a string
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResult>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), None)
    }

    pub fn greeting() -> Self {
        Self {
            id: "start".to_string(),
            ..Self::assistant(GREETING)
        }
    }

    pub fn apology() -> Self {
        Self::assistant(APOLOGY)
    }

    pub fn prediction(prediction: PredictionResult) -> Self {
        let content = format!("📊 Prediction for {}:", prediction.match_name);
        Self::new(Role::Assistant, content, Some(prediction))
    }

    fn new(role: Role, content: String, prediction: Option<PredictionResult>) -> Self {
        Self {
            id: Utc::now().timestamp_millis().to_string(),
            role,
            content,
            prediction,
        }
    }

    /// Creation time, when the id is a timestamp
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.id
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }
}
