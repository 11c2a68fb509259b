use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tagged failure raised while generating a response. Callers get the tag;
/// users get the fixed string from `user_message`.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("completion service error: {0}")]
    Upstream(String),

    #[error("conversation history is too short")]
    HistoryTooShort,

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl ResponseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ResponseError::Upstream(_) => {
                "Sorry, there was an error generating the response."
            }
            ResponseError::HistoryTooShort => {
                "Sorry, the conversation history is not long enough to generate a response."
            }
            ResponseError::Unknown(_) => "An unexpected error occurred.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    Response,
    Error,
}

/// The `{type, content}` result shape returned by every response-generating
/// operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub content: String,
}

impl Envelope {
    pub fn response(content: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Response,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Error,
            content: content.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == EnvelopeKind::Error
    }
}

impl From<&ResponseError> for Envelope {
    fn from(err: &ResponseError) -> Self {
        Envelope::error(err.user_message())
    }
}
