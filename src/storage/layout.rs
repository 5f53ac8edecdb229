//! Startup initialization of the on-disk layout.

use crate::config::StorageConfig;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolved on-disk locations.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub backup_path: PathBuf,
    pub legacy_config_path: PathBuf,
    pub audio_dir: PathBuf,
}

/// What `initialize` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// The legacy document was copied into the data directory
    Migrated,
    /// The managed document already existed
    AlreadyManaged,
    /// Neither document exists (first run)
    NothingToMigrate,
}

impl StorageLayout {
    pub fn from_config(storage: &StorageConfig) -> Self {
        Self {
            data_dir: storage.data_dir.clone(),
            config_path: storage.config_path(),
            backup_path: storage.backup_path(),
            legacy_config_path: storage.legacy_config_path.clone(),
            audio_dir: storage.audio_dir.clone(),
        }
    }

    /// Create the managed directories and migrate the legacy document.
    ///
    /// Safe to call more than once: existing directories are kept and the
    /// legacy document is copied only while the managed location is empty.
    /// The legacy file itself is left in place.
    pub async fn initialize(&self) -> io::Result<Migration> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        tokio::fs::create_dir_all(&self.audio_dir).await?;
        debug!(
            data_dir = %self.data_dir.display(),
            audio_dir = %self.audio_dir.display(),
            "Storage directories ready"
        );

        if exists(&self.config_path).await? {
            return Ok(Migration::AlreadyManaged);
        }
        if !exists(&self.legacy_config_path).await? {
            info!(
                path = %self.config_path.display(),
                "No configuration document yet"
            );
            return Ok(Migration::NothingToMigrate);
        }

        tokio::fs::copy(&self.legacy_config_path, &self.config_path).await?;
        info!(
            from = %self.legacy_config_path.display(),
            to = %self.config_path.display(),
            "Migrated legacy configuration document"
        );
        Ok(Migration::Migrated)
    }
}

async fn exists(path: &Path) -> io::Result<bool> {
    tokio::fs::try_exists(path).await
}
