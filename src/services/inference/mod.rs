pub mod client;
pub mod openai;

pub use client::{ChatMessage, ChatRequest, ContentPart, InferenceClient, InferenceError};
pub use openai::OpenAiClient;
