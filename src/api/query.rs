// src/api/query.rs
// Query handlers: text goes straight to the tutor; image and voice are
// normalized to text first, and a recoverable media failure short-circuits
// before any tutoring work.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::media::{MediaError, decode_data_uri};
use crate::session::StudentProfile;
use crate::state::AppState;
use crate::tutor::AnswerResult;

#[derive(Deserialize)]
pub struct TextQueryRequest {
    pub session_id: String,
    pub query: String,
}

#[derive(Deserialize)]
pub struct ImageQueryRequest {
    pub session_id: String,
    pub image_data: String,
}

#[derive(Deserialize)]
pub struct VoiceQueryRequest {
    pub session_id: String,
    pub audio_data: String,
}

#[derive(Serialize)]
pub struct QueryResponse {
    #[serde(flatten)]
    pub answer: AnswerResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcribed_text: Option<String>,
}

impl QueryResponse {
    fn answer(answer: AnswerResult) -> Self {
        Self { answer, extracted_text: None, transcribed_text: None }
    }

    fn failure(message: String) -> Self {
        Self::answer(AnswerResult::failure(message))
    }
}

/// Every query must name an already-registered session; unknown sessions are
/// rejected before any media or chat work happens.
async fn require_session(state: &AppState, session_id: &str) -> Result<StudentProfile, ApiError> {
    state.sessions.get(session_id).await.ok_or_else(|| {
        ApiError::bad_request(format!(
            "Unknown session '{session_id}'. Register the student before querying."
        ))
    })
}

pub async fn text_query(
    State(state): State<AppState>,
    Json(request): Json<TextQueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    let profile = require_session(&state, &request.session_id).await?;

    let question = request.query.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }

    info!(session_id = %profile.session_id, "Text query");
    let answer = state.tutor.answer(question, &profile).await;
    Ok(Json(QueryResponse::answer(answer)))
}

pub async fn image_query(
    State(state): State<AppState>,
    Json(request): Json<ImageQueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    let profile = require_session(&state, &request.session_id).await?;

    let (bytes, _mime) =
        decode_data_uri(&request.image_data).map_err(|e| ApiError::bad_request(e.to_string()))?;

    info!(session_id = %profile.session_id, bytes = bytes.len(), "Image query");
    let extracted = match state.images.extract(&bytes).await {
        Ok(text) => text,
        Err(err) if err.is_recoverable() => {
            info!(session_id = %profile.session_id, %err, "Image not usable");
            return Ok(Json(QueryResponse::failure(err.to_string())));
        }
        Err(err) => return Err(media_internal_error(err)),
    };

    let answer = state.tutor.answer(&extracted, &profile).await;
    Ok(Json(QueryResponse {
        answer,
        extracted_text: Some(extracted),
        transcribed_text: None,
    }))
}

pub async fn voice_query(
    State(state): State<AppState>,
    Json(request): Json<VoiceQueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    let profile = require_session(&state, &request.session_id).await?;

    let (bytes, mime) =
        decode_data_uri(&request.audio_data).map_err(|e| ApiError::bad_request(e.to_string()))?;

    info!(session_id = %profile.session_id, bytes = bytes.len(), mime = ?mime, "Voice query");
    let transcribed = match state.voice.transcribe(&bytes, mime.as_deref()).await {
        Ok(text) => text,
        Err(err) if err.is_recoverable() => {
            info!(session_id = %profile.session_id, %err, "Audio not usable");
            return Ok(Json(QueryResponse::failure(err.to_string())));
        }
        Err(err) => return Err(media_internal_error(err)),
    };

    let answer = state.tutor.answer(&transcribed, &profile).await;
    Ok(Json(QueryResponse {
        answer,
        extracted_text: None,
        transcribed_text: Some(transcribed),
    }))
}

fn media_internal_error(err: MediaError) -> ApiError {
    warn!(%err, "Media pipeline failed");
    ApiError::internal(format!("media processing failed: {err}"))
}
