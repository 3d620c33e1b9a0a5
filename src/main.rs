// src/main.rs

use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use sahayak::config::CONFIG;
use sahayak::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let level = Level::from_str(&CONFIG.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Sahayak tutoring backend");
    info!("Chat model: {}", CONFIG.chat_model);
    info!(
        "Speech locales: {} -> {} -> engine default",
        CONFIG.stt_primary_language, CONFIG.stt_secondary_language
    );
    if CONFIG.demo_mode() {
        warn!("No OPENAI_API_KEY configured - every answer will come from the demo responder");
    }

    let app_state = AppState::from_env();

    let app = sahayak::api::router::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(CONFIG.request_timeout)))
        .layer(cors_layer()?);

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_layer() -> anyhow::Result<CorsLayer> {
    let layer = if CONFIG.cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(CONFIG.cors_origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any)
    };
    Ok(layer)
}
