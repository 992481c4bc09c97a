use serde_json::{Value, json};

use crate::inference::error::{
    InferenceError, InferenceErrorKind, invalid_request, protocol_violation,
};

const ERROR_BODY_EXCERPT_CHARS: usize = 240;

pub fn endpoint_url(endpoint: &str, path: &str) -> Result<String, InferenceError> {
    let base = endpoint.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(invalid_request("ollama endpoint cannot be empty"));
    }
    Ok(format!("{}/{}", base, path.trim_start_matches('/')))
}

pub fn generate_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "prompt": prompt,
        "stream": false,
    })
}

pub fn chat_body(model: &str, prompt: &str, stream: bool) -> Value {
    json!({
        "model": model,
        "messages": [{"role": "user", "content": prompt}],
        "stream": stream,
    })
}

pub fn generate_text(payload: &Value) -> Result<String, InferenceError> {
    payload
        .get("response")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| protocol_violation("ollama generate payload has no 'response' string"))
}

pub fn chat_text(payload: &Value) -> Result<String, InferenceError> {
    chat_delta(payload)
        .ok_or_else(|| protocol_violation("ollama chat payload has no 'message.content' string"))
}

/// Content carried by one chat payload, streamed or not.
pub fn chat_delta(payload: &Value) -> Option<String> {
    payload
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub fn is_done(payload: &Value) -> bool {
    payload.get("done").and_then(Value::as_bool).unwrap_or(false)
}

/// Splits complete NDJSON lines off the front of `buffer`, leaving any
/// trailing partial line in place. Works on raw bytes so a UTF-8 sequence cut
/// by a chunk boundary is only decoded once its line is complete.
pub fn drain_ndjson_lines(buffer: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    while let Some(idx) = buffer.iter().position(|byte| *byte == b'\n') {
        let mut line = buffer.drain(..=idx).collect::<Vec<u8>>();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if !line.iter().all(u8::is_ascii_whitespace) {
            lines.push(line);
        }
    }
    lines
}

pub fn map_http_error(status: u16, model: &str, body: &str) -> InferenceError {
    let excerpt = body.chars().take(ERROR_BODY_EXCERPT_CHARS).collect::<String>();
    let mut message = format!("ollama returned status {}", status);
    if !excerpt.trim().is_empty() {
        message = format!("{}: {}", message, excerpt.trim());
    }

    let kind = if status == 408 {
        InferenceErrorKind::Timeout
    } else {
        InferenceErrorKind::HttpStatus
    };

    InferenceError::new(kind, message)
        .with_model(model.to_string())
        .with_http_status(status)
}
