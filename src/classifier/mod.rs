use std::sync::Arc;

use crate::inference::InferencePort;

pub mod prompts;
pub mod resolve;
pub mod taxonomy;

pub use prompts::ClassificationInput;
pub use resolve::{Classification, ClassificationOutcome, resolve_label};
pub use taxonomy::{MatchPolicy, Sentinels, Taxonomy};

const LOG_PREVIEW_CHARS: usize = 50;

/// Assigns one category per disease by asking the inference service.
///
/// Never fails: short input, unmapped replies and service errors all resolve
/// to the taxonomy's sentinels, tagged with the matching
/// [`ClassificationOutcome`].
pub struct Classifier {
    port: Arc<dyn InferencePort>,
    taxonomy: Taxonomy,
}

impl Classifier {
    pub fn new(port: Arc<dyn InferencePort>, taxonomy: Taxonomy) -> Self {
        Self { port, taxonomy }
    }

    pub async fn classify(&self, input: &ClassificationInput) -> Classification {
        let description = input.description.trim();
        if description.chars().count() < self.taxonomy.min_description_chars {
            tracing::warn!(
                target: "classifier",
                name = input.name.as_deref().unwrap_or("-"),
                description_chars = description.chars().count(),
                min_chars = self.taxonomy.min_description_chars,
                "insufficient_description"
            );
            return Classification::new(
                self.taxonomy.sentinels.insufficient_input.clone(),
                ClassificationOutcome::InsufficientInput,
            );
        }

        let prompt = prompts::build_prompt(&self.taxonomy, input);
        let reply = match self.port.complete(&prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    target: "classifier",
                    error = %err,
                    kind = ?err.kind,
                    "inference_failed"
                );
                return Classification::new(
                    self.taxonomy.sentinels.service_error.clone(),
                    ClassificationOutcome::ServiceError,
                );
            }
        };

        let classification = resolve_label(&reply, &self.taxonomy);
        let preview = preview(description);
        match classification.outcome {
            ClassificationOutcome::NoMatch => tracing::warn!(
                target: "classifier",
                reply = %reply.trim(),
                fallback = %classification.label,
                "unexpected_reply"
            ),
            _ => tracing::info!(
                target: "classifier",
                description = %preview,
                category = %classification.label,
                outcome = ?classification.outcome,
                "categorized"
            ),
        }
        classification
    }
}

fn preview(text: &str) -> String {
    let mut preview = text.chars().take(LOG_PREVIEW_CHARS).collect::<String>();
    if text.chars().count() > LOG_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
