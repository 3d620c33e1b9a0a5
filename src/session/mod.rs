// src/session/mod.rs
// In-memory registry mapping a session id to a registered student profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A registered student, keyed by session id. Lives for the process lifetime;
/// re-registering the same session id overwrites the whole profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub session_id: String,
    #[serde(rename = "class")]
    pub class_level: String,
    pub board: String,
    #[serde(rename = "language")]
    pub language_style: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub registered_at: DateTime<Utc>,
}

/// Fields supplied at registration time, before the store stamps
/// `registered_at`.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub class_level: String,
    pub board: String,
    pub language_style: String,
    pub display_name: String,
}

/// Owned, injectable session registry. Reads are concurrent; writes take the
/// lock exclusively. Entries are independent by session id, so a single map
/// lock is enough.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, StudentProfile>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes (or overwrites, last-write-wins) the profile for `session_id`
    /// and returns the stored copy.
    pub async fn register(&self, session_id: &str, fields: Registration) -> StudentProfile {
        let profile = StudentProfile {
            session_id: session_id.to_string(),
            class_level: fields.class_level,
            board: fields.board,
            language_style: fields.language_style,
            display_name: fields.display_name,
            registered_at: Utc::now(),
        };
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), profile.clone());
        profile
    }

    pub async fn get(&self, session_id: &str) -> Option<StudentProfile> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
