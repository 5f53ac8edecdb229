use crate::admin::AdminSession;
use crate::error::{AppError, AppResult};
use crate::storage::{AssetCatalog, UploadCandidate, UploadPipeline};
use axum::{
    body::Body,
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Path, Request, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use soundboard_types::{ApiResponse, DeleteRequest, ErrorCode, MessageData, UploadReport};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

/// Multipart field carrying the files of an upload batch
const FILES_FIELD: &str = "files";

const AUDIO_CACHE_CONTROL: &str = "public, max-age=31536000";

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::bad_request(err.body_text())
    }
}

/// Handler: GET /api/audio-files
pub async fn list_audio_files(
    _admin: AdminSession,
    State(catalog): State<Arc<AssetCatalog>>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let files = catalog.list().await?;
    Ok(Json(ApiResponse::ok(files)))
}

/// Handler: DELETE /api/audio-files
pub async fn delete_audio_file(
    _admin: AdminSession,
    State(catalog): State<Arc<AssetCatalog>>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<MessageData>>> {
    let Json(request) = payload?;
    let filename = request
        .filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::bad_request("Filename is required"))?;

    catalog.delete(&filename).await?;
    Ok(Json(ApiResponse::ok(MessageData::new(
        "File deleted successfully",
    ))))
}

/// Handler: POST /api/upload
///
/// Every `files` part is processed; other parts are skipped. The batch is a
/// success when at least one file was stored. When none was, the report is
/// still returned alongside the error.
pub async fn upload_audio_files(
    _admin: AdminSession,
    State(uploads): State<Arc<UploadPipeline>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let mut multipart = multipart?;
    let mut candidates = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            debug!(field = ?field.name(), "Skipping non-file multipart field");
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let declared_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        candidates.push(UploadCandidate::new(original_name, declared_type, bytes));
    }

    if candidates.is_empty() {
        return Err(AppError::bad_request("No files provided"));
    }

    let report = uploads.ingest(candidates).await;
    if report.any_succeeded() {
        return Ok(Json(ApiResponse::ok(report)).into_response());
    }

    let message = report.message.clone();
    let body: ApiResponse<UploadReport> =
        ApiResponse::failure_with(report, ErrorCode::UploadFailed, message);
    Ok((StatusCode::BAD_REQUEST, Json(body)).into_response())
}

/// Handler: GET /api/audio/{filename}
///
/// Public playback. Range and conditional requests are answered by the file
/// service; the content type comes from the extension.
pub async fn serve_audio(
    State(catalog): State<Arc<AssetCatalog>>,
    Path(filename): Path<String>,
    request: Request,
) -> AppResult<Response> {
    let asset = catalog.locate(&filename).await?;

    let response = ServeFile::new(&asset.path)
        .oneshot(request)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    let mut response = response.map(Body::new);

    if response.status().is_success() || response.status() == StatusCode::NOT_MODIFIED {
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(asset.format.media_type()),
        );
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(AUDIO_CACHE_CONTROL),
        );
    }
    Ok(response)
}
