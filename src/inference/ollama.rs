use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response, header};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use crate::inference::{
    InferencePort,
    error::{InferenceError, InferenceErrorKind, protocol_violation, transport_error},
    http_common,
    types::{InferenceConfig, OllamaApi, TextDeltaStream},
};

const STREAM_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    config: InferenceConfig,
}

impl OllamaClient {
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        http_common::endpoint_url(&config.endpoint, "")?;
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| transport_error(&err))?;
        Ok(Self { client, config })
    }

    /// `POST /api/generate`, non-streaming; returns the `response` field.
    pub async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = http_common::endpoint_url(&self.config.endpoint, "api/generate")?;
        let body = http_common::generate_body(&self.config.model, prompt);
        let payload = self
            .post_json(url, body)
            .instrument(self.dispatch_span("generate"))
            .await?;
        http_common::generate_text(&payload).map_err(|err| err.with_model(&self.config.model))
    }

    /// `POST /api/chat` with one user message, non-streaming.
    pub async fn chat(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = http_common::endpoint_url(&self.config.endpoint, "api/chat")?;
        let body = http_common::chat_body(&self.config.model, prompt, false);
        let payload = self
            .post_json(url, body)
            .instrument(self.dispatch_span("chat"))
            .await?;
        http_common::chat_text(&payload).map_err(|err| err.with_model(&self.config.model))
    }

    /// `POST /api/chat` with streaming on. Content deltas arrive in order; the
    /// stream ends after the payload flagged `done` or when the body ends.
    pub async fn chat_stream(&self, prompt: &str) -> Result<TextDeltaStream, InferenceError> {
        let url = http_common::endpoint_url(&self.config.endpoint, "api/chat")?;
        let body = http_common::chat_body(&self.config.model, prompt, true);
        let model = self.config.model.clone();
        let span = self.dispatch_span("chat_stream");

        let response = self
            .send(self.request(url, &body))
            .instrument(span.clone())
            .await?;

        let (tx, rx) = mpsc::channel::<Result<String, InferenceError>>(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(
            async move {
                let mut stream = response.bytes_stream();
                let mut buffer = Vec::<u8>::new();
                let mut saw_done = false;

                while let Some(item) = stream.next().await {
                    let chunk = match item {
                        Ok(chunk) => chunk,
                        Err(err) => {
                            let _ = tx.send(Err(transport_error(&err).with_model(&model))).await;
                            return;
                        }
                    };
                    buffer.extend_from_slice(&chunk);

                    for line in http_common::drain_ndjson_lines(&mut buffer) {
                        let payload = match serde_json::from_slice::<Value>(&line) {
                            Ok(payload) => payload,
                            Err(err) => {
                                let _ = tx
                                    .send(Err(protocol_violation(format!(
                                        "invalid ollama ndjson payload: {}",
                                        err
                                    ))
                                    .with_model(&model)))
                                    .await;
                                return;
                            }
                        };

                        if let Some(delta) = http_common::chat_delta(&payload)
                            && !delta.is_empty()
                            && tx.send(Ok(delta)).await.is_err()
                        {
                            return;
                        }
                        if http_common::is_done(&payload) {
                            saw_done = true;
                            break;
                        }
                    }
                    if saw_done {
                        break;
                    }
                }

                tracing::debug!(
                    target: "inference.ollama",
                    saw_done = saw_done,
                    "ollama_stream_end"
                );
            }
            .instrument(span),
        );

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    fn dispatch_span(&self, api: &'static str) -> tracing::Span {
        tracing::debug_span!(
            target: "inference.ollama",
            "ollama_dispatch",
            api = api,
            model = %self.config.model,
            timeout_ms = self.config.request_timeout_ms
        )
    }

    fn request(&self, url: String, body: &Value) -> RequestBuilder {
        let mut builder = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body);
        if let Some(timeout) = self.config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder
    }

    async fn post_json(&self, url: String, body: Value) -> Result<Value, InferenceError> {
        let response = self.send(self.request(url, &body)).await?;
        let decode_started_at = Instant::now();
        let payload = response.json::<Value>().await.map_err(|err| {
            tracing::debug!(
                target: "inference.ollama",
                error = %err,
                "ollama_body_decode_error"
            );
            let mapped = if err.is_timeout() {
                transport_error(&err)
            } else {
                InferenceError::new(
                    InferenceErrorKind::ProtocolViolation,
                    format!("invalid ollama response payload: {}", err),
                )
            };
            mapped.with_model(&self.config.model)
        })?;
        tracing::debug!(
            target: "inference.ollama",
            decode_ms = decode_started_at.elapsed().as_millis() as u64,
            "ollama_payload_ready"
        );
        Ok(payload)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, InferenceError> {
        let started_at = Instant::now();
        let response = builder.send().await.map_err(|err| {
            tracing::debug!(
                target: "inference.ollama",
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                error = %err,
                "ollama_http_error"
            );
            transport_error(&err).with_model(&self.config.model)
        })?;

        let status = response.status().as_u16();
        tracing::debug!(
            target: "inference.ollama",
            status = status,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "ollama_http_headers"
        );

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http_common::map_http_error(
                status,
                &self.config.model,
                &body,
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl InferencePort for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        match self.config.api {
            OllamaApi::Chat => self.chat(prompt).await,
            OllamaApi::Generate => self.generate(prompt).await,
        }
    }
}
