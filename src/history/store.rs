use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::ChatMessage;

/// Where a chat transcript is kept between sessions
pub trait TranscriptStore {
    /// An absent transcript loads as empty
    fn load(&self) -> Result<Vec<ChatMessage>>;

    fn save(&self, transcript: &[ChatMessage]) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct TranscriptFile {
    version: String,
    messages: Vec<ChatMessage>,
}

const FORMAT_VERSION: &str = "1.0";

/// Transcript stored as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptStore for JsonFileStore {
    fn load(&self) -> Result<Vec<ChatMessage>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read transcript: {}", self.path.display()))?;

        let file: TranscriptFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse transcript: {}", self.path.display()))?;

        tracing::debug!(
            "Loaded {} messages from {}",
            file.messages.len(),
            self.path.display()
        );

        Ok(file.messages)
    }

    fn save(&self, transcript: &[ChatMessage]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create transcript directory: {}", parent.display())
            })?;
        }

        let file = TranscriptFile {
            version: FORMAT_VERSION.to_string(),
            messages: transcript.to_vec(),
        };
        let content =
            serde_json::to_string_pretty(&file).with_context(|| "Failed to serialize transcript")?;

        // replace via temp file + rename
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write transcript: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace transcript: {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::prediction::assemble;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("history.json"));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("history.json"));

        let transcript = vec![
            ChatMessage::greeting(),
            ChatMessage::user("Real Madrid vs Liverpool"),
            ChatMessage::prediction(assemble(None, &[], "No data found.")),
        ];
        store.save(&transcript).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, transcript);
        assert_eq!(loaded[1].role, Role::User);
        assert!(!dir.path().join("nested").join("history.json.tmp").exists());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("history.json"));

        store.save(&[ChatMessage::user("first")]).unwrap();
        store.save(&[]).unwrap();

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(JsonFileStore::new(path).load().is_err());
    }
}
