//! Persistence of the soundboard configuration document.
//!
//! The document is YAML. Every accepted write first refreshes a single
//! backup copy of the current document, then replaces the document through a
//! temporary file and a rename, so readers see either the old or the new
//! document and never a partial one.

use crate::error::{AppError, AppResult};
use serde_json::Value;
use soundboard_types::SoundboardConfig;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

pub struct ConfigStore {
    path: PathBuf,
    backup_path: PathBuf,
    /// Serializes backup + replace so two writers cannot interleave
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_path: backup_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Read the current document.
    ///
    /// An absent document is `ConfigNotFound`, distinct from a document that
    /// exists but does not parse.
    pub async fn read(&self) -> AppResult<SoundboardConfig> {
        read_document(&self.path).await
    }

    /// Read the backup slot. Recovery from it is manual.
    pub async fn read_backup(&self) -> AppResult<SoundboardConfig> {
        read_document(&self.backup_path).await
    }

    /// Check the shape of an untyped document.
    pub fn validate(value: Value) -> AppResult<SoundboardConfig> {
        match value.get("categories") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(AppError::ConfigValidation(
                    "`categories` must be a list".to_string(),
                ))
            }
            None => {
                return Err(AppError::ConfigValidation(
                    "missing `categories` list".to_string(),
                ))
            }
        }
        serde_json::from_value(value).map_err(|e| AppError::ConfigValidation(e.to_string()))
    }

    /// Validate and write an untyped document. Nothing touches disk when
    /// validation fails.
    pub async fn write_value(&self, value: Value) -> AppResult<SoundboardConfig> {
        let config = Self::validate(value)?;
        self.write(&config).await?;
        Ok(config)
    }

    /// Replace the document, refreshing the backup first.
    ///
    /// The new document is staged next to the primary before anything else
    /// changes, so a failure while writing it leaves both files untouched.
    pub async fn write(&self, config: &SoundboardConfig) -> AppResult<()> {
        let yaml = serde_yaml::to_string(config)
            .map_err(|e| AppError::internal(format!("failed to serialize configuration: {}", e)))?;

        let _guard = self.write_lock.lock().await;

        let staged = stage(&self.path, yaml.as_bytes())
            .await
            .map_err(AppError::ConfigWrite)?;

        let committed = async {
            if tokio::fs::try_exists(&self.path).await? {
                let current = tokio::fs::read(&self.path).await?;
                replace_atomically(&self.backup_path, &current).await?;
                debug!(path = %self.backup_path.display(), "Configuration backup refreshed");
            }
            tokio::fs::rename(&staged, &self.path).await
        }
        .await;

        if let Err(e) = committed {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(AppError::ConfigWrite(e));
        }

        let sounds: usize = config.categories.iter().map(|c| c.sounds.len()).sum();
        info!(
            categories = config.categories.len(),
            sounds,
            "Configuration written"
        );
        Ok(())
    }
}

async fn read_document(path: &Path) -> AppResult<SoundboardConfig> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(AppError::ConfigNotFound),
        Err(e) => return Err(AppError::ConfigRead(e)),
    };
    Ok(serde_yaml::from_str(&content)?)
}

/// Write `contents` to a flushed temp file beside `target` and return its
/// path. The temp file is removed if writing fails.
async fn stage(target: &Path, contents: &[u8]) -> io::Result<PathBuf> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    let written = async {
        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(contents).await?;
        file.sync_all().await
    }
    .await;

    match written {
        Ok(()) => Ok(temp),
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp).await;
            Err(e)
        }
    }
}

/// Stage `contents` and rename it over `target`.
async fn replace_atomically(target: &Path, contents: &[u8]) -> io::Result<()> {
    let temp = stage(target, contents).await?;
    if let Err(e) = tokio::fs::rename(&temp, target).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    Ok(())
}
