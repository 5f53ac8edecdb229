//! Admin upload pipeline.
//!
//! Each file in a batch is judged on its own. A rejected file never stops
//! the rest of the batch, and a file is written only after every check has
//! passed.

use crate::storage::filename::resolve_within;
use bytes::Bytes;
use soundboard_types::{AudioFormat, ErrorCode, UploadReport, UploadResult};
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// One file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub original_name: String,
    pub declared_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadCandidate {
    pub fn new(
        original_name: impl Into<String>,
        declared_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            declared_type,
            bytes: bytes.into(),
        }
    }
}

/// Why a candidate was turned away.
#[derive(Debug)]
enum Rejection {
    TooLarge { max: u64 },
    MediaType,
    Extension,
    Name,
    Exists,
    Write(io::Error),
}

impl Rejection {
    fn code(&self) -> ErrorCode {
        match self {
            Self::TooLarge { .. } => ErrorCode::FileTooLarge,
            Self::MediaType | Self::Extension => ErrorCode::InvalidFileType,
            Self::Name => ErrorCode::InvalidFileName,
            Self::Exists => ErrorCode::FileExists,
            Self::Write(_) => ErrorCode::UploadFailed,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::TooLarge { max } => format!(
                "File size exceeds maximum limit of {}MB",
                *max as f64 / 1024.0 / 1024.0
            ),
            Self::MediaType => "Invalid file type. Only audio files are allowed.".to_string(),
            Self::Extension => format!(
                "Invalid file extension. Allowed: {}",
                AudioFormat::allowed_extensions()
            ),
            Self::Name => "Invalid filename".to_string(),
            Self::Exists => "File already exists".to_string(),
            Self::Write(_) => "Upload failed".to_string(),
        }
    }
}

pub struct UploadPipeline {
    dir: PathBuf,
    max_file_size: u64,
}

impl UploadPipeline {
    pub fn new(dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            dir: dir.into(),
            max_file_size,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Process a batch in submission order.
    pub async fn ingest(&self, candidates: Vec<UploadCandidate>) -> UploadReport {
        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let result = match self.store(&candidate).await {
                Ok(stored_as) => {
                    info!(
                        file = %stored_as,
                        bytes = candidate.bytes.len(),
                        "Audio file uploaded"
                    );
                    UploadResult::stored(stored_as)
                }
                Err(rejection) => {
                    match &rejection {
                        Rejection::Write(e) => {
                            warn!(file = %candidate.original_name, error = %e, "Upload write failed")
                        }
                        other => {
                            debug!(file = %candidate.original_name, reason = ?other, "Upload rejected")
                        }
                    }
                    UploadResult::rejected(
                        candidate.original_name.clone(),
                        rejection.code(),
                        rejection.message(),
                    )
                }
            };
            results.push(result);
        }

        let report = UploadReport::from_results(results);
        info!(
            total = report.summary.total,
            success = report.summary.success,
            failed = report.summary.failed,
            "Upload batch processed"
        );
        report
    }

    async fn store(&self, candidate: &UploadCandidate) -> Result<String, Rejection> {
        if candidate.bytes.len() as u64 > self.max_file_size {
            return Err(Rejection::TooLarge {
                max: self.max_file_size,
            });
        }

        let declared_ok = candidate
            .declared_type
            .as_deref()
            .is_some_and(AudioFormat::is_accepted_media_type);
        if !declared_ok {
            return Err(Rejection::MediaType);
        }

        if AudioFormat::from_filename(&candidate.original_name).is_none() {
            return Err(Rejection::Extension);
        }

        let (name, path) =
            resolve_within(&self.dir, &candidate.original_name).map_err(|_| Rejection::Name)?;
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && AudioFormat::from_extension(ext).is_some() => {}
            _ => return Err(Rejection::Name),
        }

        self.persist(&path, &candidate.bytes).await?;
        Ok(name)
    }

    async fn persist(&self, path: &Path, bytes: &[u8]) -> Result<(), Rejection> {
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(Rejection::Exists),
            Err(e) => return Err(Rejection::Write(e)),
        };

        let written = async {
            file.write_all(bytes).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(path).await;
            return Err(Rejection::Write(e));
        }
        Ok(())
    }
}
