use crate::admin::AdminSession;
use crate::error::AppResult;
use crate::storage::{AssetCatalog, ConfigStore};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use soundboard_types::{ApiResponse, MessageData, SoundboardConfig};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Handler: GET /api/config
///
/// Public: the playback page renders from it.
pub async fn get_config(
    State(store): State<Arc<ConfigStore>>,
) -> AppResult<Json<ApiResponse<SoundboardConfig>>> {
    let config = store.read().await?;
    Ok(Json(ApiResponse::ok(config)))
}

/// Handler: POST /api/config
pub async fn update_config(
    _admin: AdminSession,
    State(store): State<Arc<ConfigStore>>,
    State(catalog): State<Arc<AssetCatalog>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ApiResponse<MessageData>>> {
    let Json(value) = payload?;
    let config = store.write_value(value).await?;
    report_dangling(&config, &catalog).await;
    Ok(Json(ApiResponse::ok(MessageData::new(
        "Configuration updated successfully",
    ))))
}

/// Sounds may name files that are not uploaded yet; only log them.
async fn report_dangling(config: &SoundboardConfig, catalog: &AssetCatalog) {
    let Ok(present) = catalog.list().await else {
        return;
    };
    let present: HashSet<&str> = present.iter().map(String::as_str).collect();
    let dangling: Vec<&str> = config
        .referenced_files()
        .filter(|f| !present.contains(f))
        .collect();
    if !dangling.is_empty() {
        warn!(files = ?dangling, "Configuration references missing audio files");
    }
}
