//! Wire types shared by the soundboard server and the admin CLI.
//!
//! This crate holds only plain data: the response envelope, the numeric
//! error codes, the configuration document and the upload report. It has no
//! HTTP or filesystem dependencies so both sides of the wire can use it.

pub mod audio;
pub mod envelope;
pub mod sound;
pub mod upload;

pub use audio::AudioFormat;
pub use envelope::{ApiError, ApiResponse, ErrorCode, ErrorFamily, MessageData};
pub use sound::{Category, Sound, SoundboardConfig};
pub use upload::{UploadReport, UploadResult, UploadSummary};

use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `DELETE /api/audio-files`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub filename: Option<String>,
}

/// Data of a successful `GET /api/auth/verify`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyData {
    pub authenticated: bool,
}

/// Name of the legacy plaintext credential header.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Default name of the session cookie.
pub const SESSION_COOKIE: &str = "admin-session";
