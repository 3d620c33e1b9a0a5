// src/media/mod.rs
// Normalizes uploaded media (images, audio clips) into plain question text.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use thiserror::Error;

pub mod image;
pub mod voice;

pub use image::{ImageReader, OcrEngine, OcrError, TesseractOcr};
pub use voice::{SpeechError, SpeechRecognizer, VoiceTranscriber, WhisperApi};

#[derive(Debug, Error)]
pub enum MediaError {
    /// Malformed upload (bad data URI, invalid base64). Client error.
    #[error("invalid media payload: {0}")]
    InvalidPayload(String),

    /// OCR ran but produced no text worth answering.
    #[error("Could not read any text from the image. Please upload a clearer photo of the question.")]
    UnreadableImage,

    /// Every attempt in the recognition chain failed to understand the clip.
    #[error("Could not understand the audio. Please speak clearly and try again.")]
    Unintelligible,

    /// The speech service itself is down. Reported once, never retried.
    #[error("The speech service is unavailable right now. Please try again later.")]
    SpeechServiceDown,

    /// The OCR engine broke (missing binary, crash, timeout). Internal.
    #[error("OCR engine failure: {0}")]
    Ocr(String),

    /// Temporary media storage failed. Internal.
    #[error("media storage failure: {0}")]
    Io(String),
}

impl MediaError {
    /// Recoverable failures carry an instructional message for the student;
    /// the rest are internal faults surfaced as server errors.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnreadableImage | Self::Unintelligible | Self::SpeechServiceDown
        )
    }
}

/// Decodes a `data:<mime>;base64,<payload>` URI, or bare base64, into bytes
/// plus the declared MIME type when one was present.
pub fn decode_data_uri(payload: &str) -> Result<(Vec<u8>, Option<String>), MediaError> {
    let payload = payload.trim();
    let (mime, encoded) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest.split_once(',').ok_or_else(|| {
                MediaError::InvalidPayload("data URI has no payload section".into())
            })?;
            let mime = meta
                .split(';')
                .next()
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            (mime, data)
        }
        None => (None, payload),
    };

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| MediaError::InvalidPayload(format!("payload is not valid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(MediaError::InvalidPayload("payload is empty".into()));
    }
    Ok((bytes, mime))
}
