//! Chat completion client used to write the README.
//!
//! [`OpenAiClient`] talks to any OpenAI-compatible `/chat/completions`
//! endpoint. Callers depend on [`ReadmeGenerator`] so tests can swap in a
//! canned generator.

use log::{debug, info};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Models offered when none is configured.
pub const SUGGESTED_MODELS: &[&str] = &["gpt-3.5-turbo", "gpt-4"];

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request to the completion API failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("completion API returned no content")]
    EmptyResponse,
    #[error("failed to decode completion response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Something that turns a prompt into README text.
pub trait ReadmeGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerateError>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl ReadmeGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let body = request_body(&self.model, prompt);
        info!("Requesting completion from {} ({})", self.base_url, self.model);
        debug!("Prompt is {} bytes", prompt.len());

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Completion API answered {status} with {} bytes", text.len());

        if !status.is_success() {
            return Err(GenerateError::Api {
                status,
                message: error_message(&text),
            });
        }
        parse_completion(&text)
    }
}

fn request_body<'a>(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
    }
}

/// Extracts the first choice's content from a completion response body.
pub fn parse_completion(body: &str) -> Result<String, GenerateError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerateError::EmptyResponse)
}

/// Pulls `error.message` out of an API error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(request_body("gpt-4", "hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-4",
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn test_parse_completion() {
        let body = r##"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "# Project\n"}, "finish_reason": "stop"}
            ]
        }"##;
        assert_eq!(parse_completion(body).unwrap(), "# Project\n");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, GenerateError::EmptyResponse));

        let err = parse_completion(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap_err();
        assert!(matches!(err, GenerateError::EmptyResponse));
    }

    #[test]
    fn test_parse_completion_invalid_json() {
        let err = parse_completion("not json").unwrap_err();
        assert!(matches!(err, GenerateError::Decode(_)));
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenAiClient::new(
            "key".into(),
            "gpt-4".into(),
            Some("http://localhost:8080/v1/".into()),
        );
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
