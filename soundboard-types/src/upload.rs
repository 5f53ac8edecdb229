use crate::envelope::ErrorCode;
use serde::{Deserialize, Serialize};

/// Outcome for one submitted file.
///
/// On success `filename` is the sanitized name the asset is stored under;
/// on failure it echoes the name the client submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub filename: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl UploadResult {
    pub fn stored(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            success: true,
            error: None,
            code: None,
        }
    }

    pub fn rejected(filename: impl Into<String>, code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            success: false,
            error: Some(error.into()),
            code: Some(code),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// Batch result of one upload request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    pub results: Vec<UploadResult>,
    pub summary: UploadSummary,
    pub message: String,
}

impl UploadReport {
    pub fn from_results(results: Vec<UploadResult>) -> Self {
        let total = results.len();
        let success = results.iter().filter(|r| r.success).count();
        let failed = total - success;
        let message = if failed > 0 {
            format!("{}/{} files uploaded successfully", success, total)
        } else {
            format!("All {} files uploaded successfully", total)
        };

        Self {
            results,
            summary: UploadSummary {
                total,
                success,
                failed,
            },
            message,
        }
    }

    /// A batch succeeds when at least one file landed.
    pub fn any_succeeded(&self) -> bool {
        self.summary.success > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary_counts() {
        let report = UploadReport::from_results(vec![
            UploadResult::stored("a.mp3"),
            UploadResult::rejected("b.exe", ErrorCode::InvalidFileType, "bad type"),
            UploadResult::stored("c.wav"),
        ]);

        assert_eq!(
            report.summary,
            UploadSummary {
                total: 3,
                success: 2,
                failed: 1
            }
        );
        assert_eq!(report.message, "2/3 files uploaded successfully");
        assert!(report.any_succeeded());
    }

    #[test]
    fn test_report_all_rejected() {
        let report = UploadReport::from_results(vec![UploadResult::rejected(
            "x.txt",
            ErrorCode::InvalidFileType,
            "bad type",
        )]);
        assert!(!report.any_succeeded());
        assert_eq!(report.summary.failed, 1);
    }
}
