// src/api/router.rs
// HTTP router composition for the REST API endpoints.

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

use super::{
    query::{image_query, text_query, voice_query},
    student::{register_student, student_info},
};
use crate::state::AppState;

/// Full application router. Middleware layers (tracing, CORS, timeouts) are
/// applied by the binary on top of this.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router())
        .with_state(state)
}

/// API routes, nested under /api
fn api_router() -> Router<AppState> {
    Router::new()
        // Student sessions
        .route("/student/register", post(register_student))
        .route("/student/info/{session_id}", get(student_info))
        // Queries by modality
        .route("/query/text", post(text_query))
        .route("/query/image", post(image_query))
        .route("/query/voice", post(voice_query))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "sahayak" }))
}
