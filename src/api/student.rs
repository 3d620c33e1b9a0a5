// src/api/student.rs
// Session registration and profile lookup handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::session::{Registration, StudentProfile};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub session_id: String,
    #[serde(rename = "class", default)]
    pub class_level: String,
    #[serde(default)]
    pub board: String,
    #[serde(rename = "language", default)]
    pub language_style: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
}

#[derive(Serialize)]
pub struct StudentInfoResponse {
    pub success: bool,
    pub student_info: StudentProfile,
}

pub async fn register_student(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<StudentInfoResponse>> {
    let session_id = request.session_id.trim();
    if session_id.is_empty() {
        return Err(ApiError::bad_request("session_id is required"));
    }

    let profile = state
        .sessions
        .register(
            session_id,
            Registration {
                class_level: request.class_level,
                board: request.board,
                language_style: request.language_style,
                display_name: request.display_name,
            },
        )
        .await;

    info!(session_id = %profile.session_id, class = %profile.class_level, "Registered student");
    Ok(Json(StudentInfoResponse { success: true, student_info: profile }))
}

pub async fn student_info(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<StudentInfoResponse>> {
    let profile = state.sessions.get(&session_id).await.ok_or_else(|| {
        ApiError::not_found(format!("No student registered for session '{session_id}'"))
    })?;

    Ok(Json(StudentInfoResponse { success: true, student_info: profile }))
}
