use crate::admin::auth_routes;
use crate::config::WebConfig;
use crate::error::AppError;
use crate::web::audio_routes::{delete_audio_file, list_audio_files, serve_audio, upload_audio_files};
use crate::web::config_routes::{get_config, update_config};
use crate::web::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Known path, unsupported method
async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn api_routes(web: &WebConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/config", get(get_config).post(update_config))
        .route(
            "/audio-files",
            get(list_audio_files).delete(delete_audio_file),
        )
        .route(
            "/upload",
            post(upload_audio_files).layer(DefaultBodyLimit::max(web.max_request_bytes)),
        )
        .route("/audio/{filename}", get(serve_audio))
        .method_not_allowed_fallback(method_not_allowed)
}

/// Create the application router.
///
/// Paths the API does not claim fall through to the static directory.
pub fn create_router(state: AppState, web: &WebConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes(web))
        .fallback_service(ServeDir::new(&web.static_dir))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(TraceLayer::new_for_http())
}
