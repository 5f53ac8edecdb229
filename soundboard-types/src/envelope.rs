use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Uniform response envelope: `{success, data?, error?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError::new(code, message)),
        }
    }

    /// Failure that still carries a payload (e.g. an upload report where
    /// every file was rejected).
    pub fn failure_with(data: T, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(ApiError::new(code, message)),
        }
    }
}

/// Error part of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code.as_u16())
    }
}

/// Simple `{message}` payload used by acknowledgement responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error classes callers can branch on without matching strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFamily {
    Authentication,
    File,
    Configuration,
    General,
}

/// Numeric error codes carried in the envelope.
///
/// The hundreds digit selects the family: 10xx authentication, 11xx file,
/// 12xx configuration, 13xx general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    InvalidPassword = 1001,
    MissingPassword = 1002,

    FileNotFound = 1101,
    FileTooLarge = 1102,
    InvalidFileType = 1103,
    UploadFailed = 1104,
    DeleteFailed = 1105,
    FileExists = 1106,
    InvalidFileName = 1107,

    ConfigReadError = 1201,
    ConfigWriteError = 1202,
    ConfigParseError = 1203,
    ConfigValidationError = 1204,

    InternalServerError = 1301,
    MethodNotAllowed = 1302,
    BadRequest = 1303,
}

impl ErrorCode {
    const ALL: [ErrorCode; 16] = [
        ErrorCode::InvalidPassword,
        ErrorCode::MissingPassword,
        ErrorCode::FileNotFound,
        ErrorCode::FileTooLarge,
        ErrorCode::InvalidFileType,
        ErrorCode::UploadFailed,
        ErrorCode::DeleteFailed,
        ErrorCode::FileExists,
        ErrorCode::InvalidFileName,
        ErrorCode::ConfigReadError,
        ErrorCode::ConfigWriteError,
        ErrorCode::ConfigParseError,
        ErrorCode::ConfigValidationError,
        ErrorCode::InternalServerError,
        ErrorCode::MethodNotAllowed,
        ErrorCode::BadRequest,
    ];

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_u16() == code)
    }

    pub fn family(self) -> ErrorFamily {
        match self.as_u16() / 100 {
            10 => ErrorFamily::Authentication,
            11 => ErrorFamily::File,
            12 => ErrorFamily::Configuration,
            _ => ErrorFamily::General,
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u16::deserialize(deserializer)?;
        ErrorCode::from_u16(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown error code {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_families() {
        assert_eq!(ErrorCode::InvalidPassword.family(), ErrorFamily::Authentication);
        assert_eq!(ErrorCode::MissingPassword.family(), ErrorFamily::Authentication);
        assert_eq!(ErrorCode::FileExists.family(), ErrorFamily::File);
        assert_eq!(ErrorCode::ConfigValidationError.family(), ErrorFamily::Configuration);
        assert_eq!(ErrorCode::BadRequest.family(), ErrorFamily::General);
    }

    #[test]
    fn test_error_code_serializes_as_number() {
        let err = ApiError::new(ErrorCode::FileTooLarge, "too big");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], 1102);

        let back: ApiError = serde_json::from_value(json).unwrap();
        assert_eq!(back.code, ErrorCode::FileTooLarge);
    }

    #[test]
    fn test_unknown_error_code_rejected() {
        let result: Result<ErrorCode, _> = serde_json::from_str("4242");
        assert!(result.is_err());
    }

    #[test]
    fn test_envelope_omits_empty_fields() {
        let ok = ApiResponse::ok(MessageData::new("done"));
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());

        let failed: ApiResponse<MessageData> =
            ApiResponse::failure(ErrorCode::BadRequest, "nope");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], 1303);
    }
}
