//! Chat-completion interface used by the alt-text pipeline.
//!
//! Request types serialize directly into the OpenAI chat-completions body.
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("inference api answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("inference api returned no choices")]
    NoChoices,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System { content: String },
    User { content: Vec<ContentPart> },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
    pub detail: &'static str,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Low detail keeps the vision call cheap.
    pub fn image(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: "low",
            },
        }
    }
}

impl ChatRequest {
    pub fn has_image(&self) -> bool {
        self.messages.iter().any(|m| match m {
            ChatMessage::User { content } => content
                .iter()
                .any(|p| matches!(p, ContentPart::ImageUrl { .. })),
            ChatMessage::System { .. } => false,
        })
    }
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Content of the first choice; `None` when the model returned null content.
    async fn complete(&self, request: &ChatRequest) -> Result<Option<String>, InferenceError>;
}
