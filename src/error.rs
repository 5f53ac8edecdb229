use axum::http::StatusCode;
use soundboard_types::{ApiResponse, ErrorCode};
use thiserror::Error;
use tracing::error;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Admin password is required")]
    MissingPassword,

    #[error("Invalid admin password")]
    InvalidPassword,

    #[error("Authentication required")]
    AuthRequired,

    #[error("Configuration file not found")]
    ConfigNotFound,

    #[error("Failed to read configuration: {0}")]
    ConfigRead(#[source] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid configuration structure: {0}")]
    ConfigValidation(String),

    #[error("Failed to update configuration: {0}")]
    ConfigWrite(#[source] std::io::Error),

    #[error("File not found")]
    FileNotFound,

    #[error("Invalid filename")]
    InvalidFileName,

    #[error("Invalid file type. Allowed: {0}")]
    InvalidFileType(String),

    #[error("Failed to delete file: {0}")]
    DeleteFailed(#[source] std::io::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Envelope code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingPassword => ErrorCode::MissingPassword,
            Self::InvalidPassword | Self::AuthRequired => ErrorCode::InvalidPassword,
            Self::ConfigNotFound | Self::FileNotFound => ErrorCode::FileNotFound,
            Self::ConfigRead(_) => ErrorCode::ConfigReadError,
            Self::ConfigParse(_) => ErrorCode::ConfigParseError,
            Self::ConfigValidation(_) => ErrorCode::ConfigValidationError,
            Self::ConfigWrite(_) => ErrorCode::ConfigWriteError,
            Self::InvalidFileName => ErrorCode::InvalidFileName,
            Self::InvalidFileType(_) => ErrorCode::InvalidFileType,
            Self::DeleteFailed(_) => ErrorCode::DeleteFailed,
            Self::BadRequest(_) => ErrorCode::BadRequest,
            Self::MethodNotAllowed => ErrorCode::MethodNotAllowed,
            Self::Io(_) | Self::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingPassword => StatusCode::BAD_REQUEST,
            Self::InvalidPassword | Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::ConfigNotFound | Self::FileNotFound => StatusCode::NOT_FOUND,
            Self::ConfigValidation(_)
            | Self::InvalidFileName
            | Self::InvalidFileType(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ConfigRead(_)
            | Self::ConfigParse(_)
            | Self::ConfigWrite(_)
            | Self::DeleteFailed(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients. Server-side failures keep their detail in
    /// the log only.
    fn public_message(&self) -> String {
        match self {
            Self::ConfigRead(_) | Self::ConfigParse(_) => {
                "Failed to read configuration".to_string()
            }
            Self::ConfigWrite(_) => "Failed to update configuration".to_string(),
            Self::DeleteFailed(_) => "Failed to delete file".to_string(),
            Self::Io(_) | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        let body: ApiResponse<()> = ApiResponse::failure(self.code(), self.public_message());
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::MissingPassword.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AuthRequired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::ConfigNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::ConfigValidation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            AppError::ConfigWrite(io).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_codes_by_family() {
        assert_eq!(AppError::AuthRequired.code(), ErrorCode::InvalidPassword);
        assert_eq!(AppError::ConfigNotFound.code(), ErrorCode::FileNotFound);
        assert_eq!(AppError::InvalidFileName.code(), ErrorCode::InvalidFileName);
        assert_eq!(
            AppError::ConfigRead(std::io::Error::other("disk")).code(),
            ErrorCode::ConfigReadError
        );
        assert_eq!(AppError::MethodNotAllowed.code(), ErrorCode::MethodNotAllowed);
        assert_eq!(
            AppError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::Io(std::io::Error::other("disk")).code(),
            ErrorCode::InternalServerError
        );
    }

    #[tokio::test]
    async fn test_into_response_envelope() {
        let resp = AppError::AuthRequired.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], 1001);
        assert_eq!(json["error"]["message"], "Authentication required");
    }

    #[tokio::test]
    async fn test_io_detail_not_leaked() {
        let resp = AppError::Io(std::io::Error::other("/srv/secret/path")).into_response();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("/srv/secret/path"));
    }

    #[tokio::test]
    async fn test_config_read_failure_envelope() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/data/sounds.yaml");
        let resp = AppError::ConfigRead(io).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], 1201);
        assert_eq!(json["error"]["message"], "Failed to read configuration");
    }
}
