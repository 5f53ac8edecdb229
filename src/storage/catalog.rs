//! The managed audio directory as seen by admin and playback endpoints.

use crate::error::{AppError, AppResult};
use crate::storage::filename::resolve_within;
use soundboard_types::AudioFormat;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A playable file inside the catalog.
#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub path: PathBuf,
    pub format: AudioFormat,
}

pub struct AssetCatalog {
    dir: PathBuf,
}

impl AssetCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of regular files with an audio extension, sorted.
    ///
    /// A missing directory is an empty catalog.
    pub async fn list(&self) -> AppResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if AudioFormat::from_filename(&name).is_none() {
                continue;
            }
            if entry.file_type().await?.is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove one file. Returns the sanitized name that was removed.
    ///
    /// Names without an audio extension are reported as not found, so the
    /// delete path can never remove anything `list` would not show.
    pub async fn delete(&self, requested: &str) -> AppResult<String> {
        let (name, path) = resolve_within(&self.dir, requested)?;
        if AudioFormat::from_filename(&name).is_none() {
            debug!(requested, "Delete refused for non-audio name");
            return Err(AppError::FileNotFound);
        }

        match tokio::fs::symlink_metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(AppError::FileNotFound),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(AppError::FileNotFound),
            Err(e) => return Err(AppError::DeleteFailed(e)),
        }

        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AppError::FileNotFound
            } else {
                AppError::DeleteFailed(e)
            }
        })?;
        info!(file = %name, "Audio file deleted");
        Ok(name)
    }

    /// Find a file for playback.
    pub async fn locate(&self, requested: &str) -> AppResult<Asset> {
        let (name, path) = resolve_within(&self.dir, requested)?;
        let format = AudioFormat::from_filename(&name)
            .ok_or_else(|| AppError::InvalidFileType(AudioFormat::allowed_extensions()))?;

        let resolved = match tokio::fs::canonicalize(&path).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(AppError::FileNotFound),
            Err(e) => return Err(AppError::Io(e)),
        };
        let root = tokio::fs::canonicalize(&self.dir).await?;
        if resolved.parent() != Some(root.as_path()) {
            warn!(file = %name, "Audio file resolves outside the managed directory");
            return Err(AppError::InvalidFileName);
        }
        if !tokio::fs::metadata(&resolved).await?.is_file() {
            return Err(AppError::FileNotFound);
        }

        Ok(Asset {
            name,
            path: resolved,
            format,
        })
    }
}
