/*
 * Responsibility
 * - POST /alt-text request pipeline
 *     parse input -> describe image (vision model) -> synthesize alt text (text model)
 * - Stages run in that order; the first failure ends the request. No retries.
 * - Nothing here touches storage.
 */
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;
use crate::services::alt_text::prompts;
use crate::services::inference::{
    ChatMessage, ChatRequest, ContentPart, InferenceClient, InferenceError,
};

/// Request body of `POST /alt-text`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltTextQuery {
    pub user_url: Option<String>,
    pub image_context: Option<String>,
    pub text_context: Option<String>,
}

/// Stage 1 output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub image_url: String,
    pub image_context: String,
    pub text_context: String,
}

/// Shape the text model is asked to produce.
#[derive(Debug, Deserialize)]
struct SynthesizedAltText {
    simple: String,
    complex: String,
}

/// Pipeline result, returned verbatim as the response body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AltText {
    pub simple: String,
    pub complex: String,
    pub description_origin: String,
    pub subjects: String,
    #[serde(rename = "targetAudience")]
    pub target_audience: String,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("image url is required")]
    MissingImageUrl,
    #[error("vision call failed: {0}")]
    Vision(#[source] InferenceError),
    #[error("vision model returned no description")]
    EmptyDescription,
    #[error("synthesis call failed: {0}")]
    Synthesis(#[source] InferenceError),
    #[error("synthesis model returned null content")]
    EmptyCompletion,
    #[error("synthesis output is not the expected json: {0}")]
    MalformedCompletion(#[source] serde_json::Error),
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::MissingImageUrl => AppError::validation("Image URL is required"),
            PipelineError::Vision(_) | PipelineError::EmptyDescription => {
                tracing::error!(error = %e, "image analysis failed");
                AppError::upstream("Failed to analyze image")
            }
            PipelineError::EmptyCompletion => {
                tracing::error!(error = %e, "alt text synthesis failed");
                AppError::upstream("OpenAI did not return a valid response")
            }
            PipelineError::Synthesis(_) | PipelineError::MalformedCompletion(_) => {
                tracing::error!(error = %e, "alt text synthesis failed");
                AppError::upstream("Failed to process alt text")
            }
        }
    }
}

/// Stage 1: a non-blank image url is required; the two context strings default to "".
pub fn parse_input(query: AltTextQuery) -> Result<ParsedQuery, PipelineError> {
    let image_url = query
        .user_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or(PipelineError::MissingImageUrl)?;

    Ok(ParsedQuery {
        image_url,
        image_context: query.image_context.unwrap_or_default(),
        text_context: query.text_context.unwrap_or_default(),
    })
}

#[derive(Clone)]
pub struct AltTextPipeline {
    inference: Arc<dyn InferenceClient>,
    model: String,
}

impl std::fmt::Debug for AltTextPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AltTextPipeline")
            .field("model", &self.model)
            .finish()
    }
}

impl AltTextPipeline {
    pub fn new(inference: Arc<dyn InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            inference,
            model: model.into(),
        }
    }

    pub async fn run(&self, query: AltTextQuery) -> Result<AltText, PipelineError> {
        let parsed = parse_input(query)?;
        let description = self.describe_image(&parsed).await?;
        self.synthesize(&parsed, description).await
    }

    /// Stage 2: one vision call, returns the model's description of the image.
    pub async fn describe_image(&self, parsed: &ParsedQuery) -> Result<String, PipelineError> {
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: Some(prompts::VISION_TEMPERATURE),
            messages: vec![ChatMessage::User {
                content: vec![
                    ContentPart::text(prompts::VISION_INSTRUCTION),
                    ContentPart::image(parsed.image_url.clone()),
                ],
            }],
        };

        let content = self
            .inference
            .complete(&request)
            .await
            .map_err(PipelineError::Vision)?;

        let description = content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(PipelineError::EmptyDescription)?;

        tracing::debug!(chars = description.len(), "image described");
        Ok(description)
    }

    /// Stage 3: turn the description plus context into `{simple, complex}` and enrich it.
    pub async fn synthesize(
        &self,
        parsed: &ParsedQuery,
        description: String,
    ) -> Result<AltText, PipelineError> {
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: None,
            messages: vec![
                ChatMessage::System {
                    content: prompts::synthesis_instruction(
                        &description,
                        &parsed.image_context,
                        &parsed.text_context,
                    ),
                },
                ChatMessage::User {
                    content: vec![ContentPart::text(prompts::synthesis_user_message(
                        &parsed.image_context,
                        &parsed.text_context,
                    ))],
                },
            ],
        };

        let completion = self
            .inference
            .complete(&request)
            .await
            .map_err(PipelineError::Synthesis)?
            .ok_or(PipelineError::EmptyCompletion)?;

        let synthesized: SynthesizedAltText = serde_json::from_str(strip_code_fence(&completion))
            .map_err(PipelineError::MalformedCompletion)?;

        Ok(AltText {
            simple: synthesized.simple,
            complex: synthesized.complex,
            description_origin: description,
            subjects: parsed.image_context.clone(),
            target_audience: parsed.text_context.clone(),
        })
    }
}

// Models sometimes wrap JSON in a ```json fence despite instructions.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
