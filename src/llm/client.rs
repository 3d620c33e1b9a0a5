// src/llm/client.rs
// Chat-completions client for any OpenAI-compatible endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatCompleter, ChatError};
use crate::config::CONFIG;

pub struct OpenAiChat {
    client: ReqwestClient,
    api_key: String,
    url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiChat {
    /// Builds a client from the process config. Returns `None` when no API
    /// credential is configured, which pins the service in demo mode.
    pub fn from_env() -> Option<Self> {
        let api_key = CONFIG.openai_api_key.clone()?;

        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(CONFIG.chat_timeout))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| ReqwestClient::new());

        Some(Self {
            client,
            api_key,
            url: CONFIG.openai_api_url("chat/completions"),
            model: CONFIG.chat_model.clone(),
            max_tokens: CONFIG.chat_max_tokens,
            temperature: CONFIG.chat_temperature,
        })
    }
}

#[async_trait]
impl ChatCompleter for OpenAiChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ChatError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(model = %self.model, "Sending chat completion request to {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &error_text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Network(format!("malformed completion response: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Maps a non-success API status to a `ChatError` kind. The body is parsed as
/// the standard `{"error": {"message": ...}}` envelope when possible.
fn classify_api_error(status: StatusCode, body: &str) -> ChatError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChatError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => ChatError::RateLimited(message),
        _ => ChatError::Api { status: status.as_u16(), message },
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_failures() {
        let err = classify_api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "Incorrect API key provided"}}"#,
        );
        assert!(matches!(err, ChatError::Auth(msg) if msg.contains("Incorrect API key")));
    }

    #[test]
    fn classifies_rate_limits() {
        let err = classify_api_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, ChatError::RateLimited(_)));
    }

    #[test]
    fn classifies_other_statuses_as_api_errors() {
        let err = classify_api_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ChatError::Api { status: 500, .. }));
    }

    #[test]
    fn falls_back_to_raw_body_when_envelope_is_not_json() {
        let err = classify_api_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        match err {
            ChatError::Api { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("bad gateway"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
