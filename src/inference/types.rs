use std::{pin::Pin, time::Duration};

use futures_core::Stream;
use serde::{Deserialize, Serialize};

use crate::inference::error::InferenceError;

pub type TextDeltaStream = Pin<Box<dyn Stream<Item = Result<String, InferenceError>> + Send>>;

/// Which Ollama endpoint carries classification prompts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OllamaApi {
    /// `POST /api/chat` with a single user message.
    Chat,
    /// `POST /api/generate` with a raw prompt.
    Generate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api")]
    pub api: OllamaApi,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl InferenceConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api: default_api(),
            model: default_model(),
            request_timeout_ms: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_api() -> OllamaApi {
    OllamaApi::Chat
}

fn default_model() -> String {
    "medllama2".to_string()
}
