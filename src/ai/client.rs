use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::http_client;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Classifier returned no content")]
    EmptyResponse,
}

/// Turns a system instruction plus a document payload into a raw reply
#[async_trait]
pub trait Classifier: Send + Sync {
    /// `system_prompt` and `document` are sent as separate message roles
    async fn classify(&self, system_prompt: &str, document: &str) -> Result<String, ClassifierError>;
}

/// Message in conversation
#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// API request body
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// API error response
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI chat-completions client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client on the shared HTTP connection pool
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_client(http_client::openai_client().clone(), api_key, model)
    }

    pub fn with_client(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: OPENAI_API_URL.to_string(),
            model,
        }
    }

    /// Point at an OpenAI-compatible endpoint (e.g. a local proxy)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Classifier for OpenAiClient {
    async fn classify(&self, system_prompt: &str, document: &str) -> Result<String, ClassifierError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: document,
                },
            ],
            temperature: 0.0,
        };

        tracing::debug!(
            "[Classifier] Sending {} + {} chars to {}",
            system_prompt.len(),
            document.len(),
            self.model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ClassifierError::EmptyResponse)?;

        tracing::debug!("[Classifier] Response: {}", text);

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_two_roles() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![
                Message {
                    role: "system",
                    content: "instruction",
                },
                Message {
                    role: "user",
                    content: "PDF:text",
                },
            ],
            temperature: 0.0,
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "instruction");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "PDF:text");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"Titel\":\"a\",\"Kategorie\":\"b\"}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some(r#"{"Titel":"a","Kategorie":"b"}"#)
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAiClient::with_client(
            Client::new(),
            "key".to_string(),
            DEFAULT_MODEL.to_string(),
        )
        .with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }
}
