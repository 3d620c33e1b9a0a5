// src/media/voice.rs
// Audio-to-text with an ordered locale fallback chain.
//
// Chain per clip: primary locale, then secondary locale, then the engine
// default. "Not understood" moves to the next attempt; a service error stops
// the chain immediately so a dead service is not hammered from the request
// path. The decoded clip lives in a scoped temp file that is removed on every
// exit path.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode, multipart};
use serde::Deserialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use super::MediaError;
use crate::config::CONFIG;

#[derive(Debug, Error)]
pub enum SpeechError {
    /// The engine ran but could not make sense of the clip.
    #[error("speech was not understood")]
    NotUnderstood,

    /// The engine itself is unreachable or failing.
    #[error("speech service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Async seam for the speech-recognition collaborator. `language` is an
/// optional locale hint; `None` asks for the engine default.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio: &Path, language: Option<&str>) -> Result<String, SpeechError>;
}

/// Speech client for an OpenAI-compatible `/v1/audio/transcriptions`
/// endpoint. The clip is uploaded as multipart with its file extension intact
/// so the service can decode the declared container format.
pub struct WhisperApi {
    client: ReqwestClient,
    api_key: Option<String>,
    url: String,
    model: String,
}

impl WhisperApi {
    pub fn from_env() -> Self {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(CONFIG.stt_timeout))
            .build()
            .unwrap_or_else(|_| ReqwestClient::new());

        Self {
            client,
            api_key: CONFIG.openai_api_key.clone(),
            url: CONFIG.openai_api_url("audio/transcriptions"),
            model: CONFIG.stt_model.clone(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperApi {
    async fn recognize(&self, audio: &Path, language: Option<&str>) -> Result<String, SpeechError> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| SpeechError::ServiceUnavailable(format!("could not read clip: {e}")))?;
        let filename = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("clip.wav")
            .to_string();

        let mut form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(filename))
            .text("model", self.model.clone())
            .text("response_format", "json");
        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        debug!(language = ?language, "Sending transcription request");
        // Attach the bearer token only when a credential is configured, so
        // local keyless endpoints keep working.
        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SpeechError::ServiceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::ServiceUnavailable(format!("malformed response: {e}")))?;
        Ok(parsed.text)
    }
}

/// A 4xx means the engine could not work with this clip; anything else means
/// the service itself is in trouble.
fn classify_status(status: StatusCode, body: &str) -> SpeechError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::UNPROCESSABLE_ENTITY => {
            SpeechError::NotUnderstood
        }
        _ => SpeechError::ServiceUnavailable(format!("{}: {}", status.as_u16(), body.trim())),
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Walks the locale fallback chain for one uploaded clip.
pub struct VoiceTranscriber {
    stt: Arc<dyn SpeechRecognizer>,
    primary_language: String,
    secondary_language: String,
}

impl VoiceTranscriber {
    pub fn new(stt: Arc<dyn SpeechRecognizer>, primary: String, secondary: String) -> Self {
        Self { stt, primary_language: primary, secondary_language: secondary }
    }

    pub fn from_env() -> Self {
        Self::new(
            Arc::new(WhisperApi::from_env()),
            CONFIG.stt_primary_language.clone(),
            CONFIG.stt_secondary_language.clone(),
        )
    }

    /// Transcribes `audio`, trying the primary locale, then the secondary,
    /// then no locale hint. Returns trimmed text on the first success.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        declared_mime: Option<&str>,
    ) -> Result<String, MediaError> {
        // NamedTempFile removes the clip on drop, whichever way we leave.
        let clip = write_clip(audio, declared_mime)?;

        let attempts: [Option<&str>; 3] = [
            Some(self.primary_language.as_str()),
            Some(self.secondary_language.as_str()),
            None,
        ];

        for language in attempts {
            match self.stt.recognize(clip.path(), language).await {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        return Ok(text.to_string());
                    }
                    // An empty transcript is "not understood" in disguise.
                    debug!(language = ?language, "Empty transcript, trying next locale");
                }
                Err(SpeechError::NotUnderstood) => {
                    debug!(language = ?language, "Speech not understood, trying next locale");
                }
                Err(SpeechError::ServiceUnavailable(reason)) => {
                    warn!(%reason, "Speech service unavailable, aborting chain");
                    return Err(MediaError::SpeechServiceDown);
                }
            }
        }

        Err(MediaError::Unintelligible)
    }
}

/// Persists the clip into a scoped temp file whose extension reflects the
/// declared container format, so format-aware engines can decode it.
fn write_clip(audio: &[u8], declared_mime: Option<&str>) -> Result<NamedTempFile, MediaError> {
    let ext = extension_for(declared_mime);
    let mut file = tempfile::Builder::new()
        .prefix("sahayak-voice-")
        .suffix(&format!(".{ext}"))
        .tempfile()
        .map_err(|e| MediaError::Io(format!("could not create temp clip: {e}")))?;
    file.write_all(audio)
        .and_then(|_| file.flush())
        .map_err(|e| MediaError::Io(format!("could not write temp clip: {e}")))?;
    Ok(file)
}

/// Maps a declared MIME type to a file extension, with `mime_guess` covering
/// the long tail and WAV as the default guess.
fn extension_for(declared_mime: Option<&str>) -> String {
    match declared_mime {
        Some("audio/wav") | Some("audio/x-wav") | Some("audio/wave") => "wav".into(),
        Some("audio/mpeg") => "mp3".into(),
        Some("audio/webm") => "webm".into(),
        Some("audio/ogg") => "ogg".into(),
        Some("audio/mp4") | Some("audio/x-m4a") => "m4a".into(),
        Some("audio/flac") | Some("audio/x-flac") => "flac".into(),
        Some(other) => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first())
            .map(|ext| (*ext).to_string())
            .unwrap_or_else(|| "wav".into()),
        None => "wav".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Plays back a fixed sequence of outcomes, recording each attempt's
    /// locale and the clip path it was handed.
    struct ScriptedRecognizer {
        script: Mutex<Vec<Result<String, SpeechError>>>,
        calls: AtomicUsize,
        languages_seen: Mutex<Vec<Option<String>>>,
        last_clip_path: Mutex<Option<String>>,
    }

    impl ScriptedRecognizer {
        fn new(script: Vec<Result<String, SpeechError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
                languages_seen: Mutex::new(Vec::new()),
                last_clip_path: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl SpeechRecognizer for ScriptedRecognizer {
        async fn recognize(
            &self,
            audio: &Path,
            language: Option<&str>,
        ) -> Result<String, SpeechError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.languages_seen
                .lock()
                .unwrap()
                .push(language.map(str::to_string));
            assert!(audio.exists(), "clip must exist while the chain is running");
            *self.last_clip_path.lock().unwrap() = Some(audio.display().to_string());
            self.script.lock().unwrap().remove(0)
        }
    }

    fn transcriber(stt: Arc<ScriptedRecognizer>) -> VoiceTranscriber {
        VoiceTranscriber::new(stt as Arc<dyn SpeechRecognizer>, "en".into(), "hi".into())
    }

    #[tokio::test]
    async fn chain_succeeds_on_third_attempt_with_engine_default() {
        let stt = ScriptedRecognizer::new(vec![
            Err(SpeechError::NotUnderstood),
            Err(SpeechError::NotUnderstood),
            Ok("what is photosynthesis".into()),
        ]);
        let text = transcriber(stt.clone())
            .transcribe(b"audio-bytes", Some("audio/wav"))
            .await
            .unwrap();

        assert_eq!(text, "what is photosynthesis");
        assert_eq!(stt.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *stt.languages_seen.lock().unwrap(),
            vec![Some("en".to_string()), Some("hi".to_string()), None]
        );
    }

    #[tokio::test]
    async fn exhausted_chain_reports_unintelligible() {
        let stt = ScriptedRecognizer::new(vec![
            Err(SpeechError::NotUnderstood),
            Err(SpeechError::NotUnderstood),
            Err(SpeechError::NotUnderstood),
        ]);
        let err = transcriber(stt.clone())
            .transcribe(b"audio-bytes", None)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Unintelligible));
        assert_eq!(stt.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn service_error_stops_the_chain_immediately() {
        let stt = ScriptedRecognizer::new(vec![Err(SpeechError::ServiceUnavailable(
            "connection refused".into(),
        ))]);
        let err = transcriber(stt.clone())
            .transcribe(b"audio-bytes", None)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::SpeechServiceDown));
        assert_eq!(stt.calls.load(Ordering::SeqCst), 1, "a dead service is not retried");
    }

    #[tokio::test]
    async fn empty_transcript_counts_as_not_understood() {
        let stt = ScriptedRecognizer::new(vec![
            Ok("   ".into()),
            Err(SpeechError::NotUnderstood),
            Ok("hello".into()),
        ]);
        let text = transcriber(stt.clone())
            .transcribe(b"audio-bytes", None)
            .await
            .unwrap();
        assert_eq!(text, "hello");
        assert_eq!(stt.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn temp_clip_is_removed_after_the_chain() {
        let stt = ScriptedRecognizer::new(vec![Ok("hello".into())]);
        transcriber(stt.clone())
            .transcribe(b"audio-bytes", Some("audio/webm"))
            .await
            .unwrap();

        let path = stt.last_clip_path.lock().unwrap().clone().unwrap();
        assert!(path.ends_with(".webm"));
        assert!(!Path::new(&path).exists(), "clip must be cleaned up on exit");
    }

    #[tokio::test]
    async fn temp_clip_is_removed_on_failure_paths_too() {
        let stt = ScriptedRecognizer::new(vec![Err(SpeechError::ServiceUnavailable("down".into()))]);
        let _ = transcriber(stt.clone()).transcribe(b"audio-bytes", None).await;

        let path = stt.last_clip_path.lock().unwrap().clone().unwrap();
        assert!(!Path::new(&path).exists(), "clip must be cleaned up on failure");
    }

    #[test]
    fn extension_mapping_prefers_known_types() {
        assert_eq!(extension_for(Some("audio/wav")), "wav");
        assert_eq!(extension_for(Some("audio/mpeg")), "mp3");
        assert_eq!(extension_for(Some("audio/webm")), "webm");
        assert_eq!(extension_for(None), "wav");
    }

    #[test]
    fn unknown_mime_falls_back_to_wav() {
        assert_eq!(extension_for(Some("application/x-unknown-audio")), "wav");
    }

    #[test]
    fn classify_status_maps_client_errors_to_not_understood() {
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "cannot decode"),
            SpeechError::NotUnderstood
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, "down"),
            SpeechError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "no key"),
            SpeechError::ServiceUnavailable(_)
        ));
    }
}
