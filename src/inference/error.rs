use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceErrorKind {
    InvalidRequest,
    Transport,
    Timeout,
    HttpStatus,
    ProtocolViolation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceError {
    pub kind: InferenceErrorKind,
    pub message: String,
    pub model: Option<String>,
    pub http_status: Option<u16>,
}

impl InferenceError {
    pub fn new(kind: InferenceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            model: None,
            http_status: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.model, self.http_status) {
            (Some(model), Some(status)) => {
                write!(f, "{} (model={}, status={})", self.message, model, status)
            }
            (Some(model), None) => write!(f, "{} (model={})", self.message, model),
            (None, Some(status)) => write!(f, "{} (status={})", self.message, status),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for InferenceError {}

pub fn invalid_request(message: impl Into<String>) -> InferenceError {
    InferenceError::new(InferenceErrorKind::InvalidRequest, message)
}

pub fn protocol_violation(message: impl Into<String>) -> InferenceError {
    InferenceError::new(InferenceErrorKind::ProtocolViolation, message)
}

pub fn transport_error(err: &reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::new(
            InferenceErrorKind::Timeout,
            format!("ollama request timed out: {}", err),
        )
    } else {
        InferenceError::new(
            InferenceErrorKind::Transport,
            format!("ollama request failed: {}", err),
        )
    }
}
