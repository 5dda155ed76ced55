use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::services::inference::client::{ChatRequest, InferenceClient, InferenceError};

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the api key
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, base_url: &Url, api_key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: format!(
                "{}/chat/completions",
                base_url.as_str().trim_end_matches('/')
            ),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl InferenceClient for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<Option<String>, InferenceError> {
        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(InferenceError::Status { status, body });
        }

        let completion: CompletionResponse = res.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(InferenceError::NoChoices)?;

        Ok(choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_joined_without_double_slashes() {
        let base = Url::parse("https://api.openai.com/v1/").unwrap();
        let client = OpenAiClient::new(reqwest::Client::new(), &base, "sk");
        assert_eq!(client.endpoint, "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn null_content_deserializes_as_none() {
        let res: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();
        assert!(res.choices[0].message.content.is_none());
    }
}
