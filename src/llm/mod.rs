// src/llm/mod.rs

use async_trait::async_trait;
use thiserror::Error;

pub mod client;

pub use client::OpenAiChat;

/// Errors from the remote chat-completion API. Every kind is absorbed by the
/// tutor layer into a local fallback answer; the distinction only feeds
/// logging and the fallback note.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The API rejected the configured credential.
    #[error("chat API rejected the credential: {0}")]
    Auth(String),

    /// The API throttled the request.
    #[error("chat API rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other non-success response from the API.
    #[error("chat API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request did not complete within the configured timeout.
    #[error("chat API request timed out")]
    Timeout,

    /// Transport-level failure before a response was received.
    #[error("chat API request failed: {0}")]
    Network(String),

    /// A well-formed response with no usable completion text.
    #[error("chat API returned an empty completion")]
    EmptyResponse,
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ChatError::Timeout
        } else {
            ChatError::Network(e.to_string())
        }
    }
}

/// Async seam for the remote chat-completion collaborator.
///
/// Implementors must be `Send + Sync` so they can sit behind an
/// `Arc<dyn ChatCompleter>` in shared state.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Sends one system + user message pair and returns the completion text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ChatError>;
}
