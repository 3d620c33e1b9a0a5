// src/state.rs

use std::sync::Arc;

use crate::media::{ImageReader, VoiceTranscriber};
use crate::session::SessionStore;
use crate::tutor::TutorService;

/// Shared application state: the session registry plus the three services a
/// request can be routed through. Everything is behind an `Arc` so handlers
/// clone cheaply, and every component is injectable for tests.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub tutor: Arc<TutorService>,
    pub images: Arc<ImageReader>,
    pub voice: Arc<VoiceTranscriber>,
}

impl AppState {
    pub fn new(
        sessions: Arc<SessionStore>,
        tutor: Arc<TutorService>,
        images: Arc<ImageReader>,
        voice: Arc<VoiceTranscriber>,
    ) -> Self {
        Self { sessions, tutor, images, voice }
    }

    /// Assembles production collaborators from the process config.
    pub fn from_env() -> Self {
        Self::new(
            Arc::new(SessionStore::new()),
            Arc::new(TutorService::from_env()),
            Arc::new(ImageReader::from_env()),
            Arc::new(VoiceTranscriber::from_env()),
        )
    }
}
