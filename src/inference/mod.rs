use async_trait::async_trait;

use crate::inference::error::InferenceError;

pub mod error;
pub mod http_common;
pub mod ollama;
pub mod types;

/// Boundary to the text-generation service.
///
/// One prompt in, the raw generated text out. Everything the classifier does
/// with the reply (matching, cleaning, sentinel fallback) lives on the caller
/// side so it can be exercised with a fake implementation.
#[async_trait]
pub trait InferencePort: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError>;
}
