// src/tutor/mod.rs
// TutorService: context-enriched answering with total absorption of remote
// chat failures into local demo answers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::CONFIG;
use crate::llm::{ChatCompleter, ChatError, OpenAiChat};
use crate::session::StudentProfile;

pub mod demo;
pub mod persona;
pub mod prompt;

pub use demo::{AgeBand, demo_answer};

/// Outcome of answering one question. Returned once per request and never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    pub success: bool,
    pub response: Option<String>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AnswerResult {
    /// A live answer from the chat API.
    pub fn answered(text: String) -> Self {
        Self {
            success: true,
            response: Some(text),
            error: None,
            note: None,
            timestamp: Utc::now(),
        }
    }

    /// A locally generated answer, with a note saying why the remote API was
    /// not used. Still a success from the caller's point of view.
    pub fn fallback(text: String, note: String) -> Self {
        Self {
            success: true,
            response: Some(text),
            error: None,
            note: Some(note),
            timestamp: Utc::now(),
        }
    }

    /// A recoverable failure carrying an instructional message for the caller.
    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(message),
            note: None,
            timestamp: Utc::now(),
        }
    }
}

/// Answers student questions. Holds the chat collaborator when a credential is
/// configured; otherwise every answer comes from the demo responder.
pub struct TutorService {
    chat: Option<Arc<dyn ChatCompleter>>,
    system_prompt: String,
}

impl TutorService {
    pub fn new(chat: Option<Arc<dyn ChatCompleter>>, system_prompt: String) -> Self {
        Self { chat, system_prompt }
    }

    /// Assembles the service from process config: the chat client when a
    /// credential exists, and the system prompt from disk or the built-in
    /// default.
    pub fn from_env() -> Self {
        let chat = OpenAiChat::from_env().map(|c| Arc::new(c) as Arc<dyn ChatCompleter>);
        if chat.is_none() {
            warn!("No chat API credential configured - running in demo mode");
        }
        Self::new(chat, load_system_prompt())
    }

    /// Answers a question for a registered student. Remote-API failures never
    /// escape this method: they converge to a demo answer with a note.
    pub async fn answer(&self, question: &str, profile: &StudentProfile) -> AnswerResult {
        let Some(chat) = &self.chat else {
            return AnswerResult::fallback(
                demo_answer(question, profile),
                "demo mode: no chat API credential configured".to_string(),
            );
        };

        let user_message = prompt::context_prompt(profile, question);
        match chat.complete(&self.system_prompt, &user_message).await {
            Ok(text) => {
                info!(session_id = %profile.session_id, "Answered via chat API");
                AnswerResult::answered(text)
            }
            Err(err) => {
                warn!(session_id = %profile.session_id, error = %err, "Chat API failed, serving demo answer");
                AnswerResult::fallback(demo_answer(question, profile), fallback_note(&err))
            }
        }
    }
}

/// Single mapping from failure kind to the note attached to the fallback
/// answer. Every kind lands on the same fallback action.
fn fallback_note(err: &ChatError) -> String {
    let reason = match err {
        ChatError::Auth(_) => "the API credential was rejected",
        ChatError::RateLimited(_) => "the API rate limit was exceeded",
        ChatError::Api { .. } => "the chat API returned an error",
        ChatError::Timeout => "the chat API timed out",
        ChatError::Network(_) => "the chat API could not be reached",
        ChatError::EmptyResponse => "the chat API returned no text",
    };
    format!("demo response: {reason}")
}

/// Reads the system prompt from the configured path, falling back to the
/// built-in persona when the file is missing or unreadable.
pub fn load_system_prompt() -> String {
    match std::fs::read_to_string(&CONFIG.system_prompt_path) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => {
            warn!(
                path = %CONFIG.system_prompt_path,
                "System prompt file missing or empty, using built-in persona"
            );
            persona::DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn profile() -> StudentProfile {
        StudentProfile {
            session_id: "s1".into(),
            class_level: "Class 8".into(),
            board: "CBSE".into(),
            language_style: "English".into(),
            display_name: "Asha".into(),
            registered_at: Utc::now(),
        }
    }

    /// Always succeeds with a fixed completion.
    struct AlwaysOk(String);

    #[async_trait]
    impl ChatCompleter for AlwaysOk {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ChatError> {
            Ok(self.0.clone())
        }
    }

    /// Always fails with the given error, counting invocations.
    struct AlwaysFails {
        kind: fn() -> ChatError,
        calls: AtomicUsize,
    }

    impl AlwaysFails {
        fn new(kind: fn() -> ChatError) -> Arc<Self> {
            Arc::new(Self { kind, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl ChatCompleter for AlwaysFails {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err((self.kind)())
        }
    }

    #[tokio::test]
    async fn live_answer_passes_through() {
        let chat = Arc::new(AlwaysOk("The sky is blue because...".into()));
        let service = TutorService::new(Some(chat as Arc<dyn ChatCompleter>), "system".into());
        let result = service.answer("why is the sky blue", &profile()).await;
        assert!(result.success);
        assert_eq!(result.response.as_deref(), Some("The sky is blue because..."));
        assert!(result.note.is_none());
    }

    #[tokio::test]
    async fn auth_failure_is_absorbed_into_demo_answer() {
        let chat = AlwaysFails::new(|| ChatError::Auth("bad key".into()));
        let service =
            TutorService::new(Some(chat.clone() as Arc<dyn ChatCompleter>), "system".into());

        let result = service.answer("what is ai", &profile()).await;
        assert!(result.success, "remote failure must not surface as an error");
        assert!(!result.response.as_deref().unwrap_or_default().is_empty());
        assert!(result.note.as_deref().unwrap().contains("demo"));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1, "no retry toward the chat API");
    }

    #[tokio::test]
    async fn every_failure_kind_converges_to_fallback() {
        let kinds: Vec<fn() -> ChatError> = vec![
            || ChatError::Auth("k".into()),
            || ChatError::RateLimited("k".into()),
            || ChatError::Api { status: 500, message: "k".into() },
            || ChatError::Timeout,
            || ChatError::Network("k".into()),
            || ChatError::EmptyResponse,
        ];
        for kind in kinds {
            let service = TutorService::new(
                Some(AlwaysFails::new(kind) as Arc<dyn ChatCompleter>),
                "system".into(),
            );
            let result = service.answer("what is photosynthesis", &profile()).await;
            assert!(result.success);
            assert!(result.note.is_some());
        }
    }

    #[tokio::test]
    async fn unconfigured_chat_goes_straight_to_demo_mode() {
        let service = TutorService::new(None, "system".into());
        let result = service.answer("what is ai", &profile()).await;
        assert!(result.success);
        assert!(result.note.as_deref().unwrap().contains("demo mode"));
    }
}
