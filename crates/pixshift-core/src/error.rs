//! Error types module
//!
//! Request-level failures of the conversion service are unified under the
//! `AppError` enum. Per-image failures never become an `AppError`: they are
//! carried inside a conversion result by the processing crate so that one bad
//! file cannot fail a whole batch.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UNSUPPORTED_FORMAT")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No files provided")]
    NoFilesProvided,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid resize parameter: {0}")]
    InvalidResizeParameter(String),

    #[error("None of the {attempted} uploaded images could be converted")]
    NoImagesConverted { attempted: usize },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::NoFilesProvided => (
            400,
            "NO_FILES_PROVIDED",
            false,
            Some("Attach at least one image in the 'file' field"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedFormat(_) => (
            400,
            "UNSUPPORTED_FORMAT",
            false,
            Some("Use one of PNG, JPEG, WEBP, GIF, BMP, TIFF"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidResizeParameter(_) => (
            400,
            "INVALID_RESIZE_PARAMETER",
            false,
            Some("Check resize_mode and its percentage or width/height fields"),
            false,
            LogLevel::Debug,
        ),
        AppError::NoImagesConverted { .. } => (
            422,
            "NO_IMAGES_CONVERTED",
            false,
            Some("Check that the uploaded files are valid images"),
            false,
            LogLevel::Warn,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size or split the batch"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::NoFilesProvided => "NoFilesProvided",
            AppError::UnsupportedFormat(_) => "UnsupportedFormat",
            AppError::InvalidResizeParameter(_) => "InvalidResizeParameter",
            AppError::NoImagesConverted { .. } => "NoImagesConverted",
            AppError::BadRequest(_) => "BadRequest",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NoFilesProvided => "no files provided".to_string(),
            AppError::UnsupportedFormat(ref format) => {
                format!("Unsupported format: '{}'", format)
            }
            AppError::InvalidResizeParameter(ref msg) => msg.clone(),
            AppError::NoImagesConverted { attempted } => format!(
                "none of the {} uploaded images could be converted",
                attempted
            ),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_are_client_errors() {
        let errors = [
            AppError::NoFilesProvided,
            AppError::UnsupportedFormat("ICO".to_string()),
            AppError::InvalidResizeParameter("percentage must be positive".to_string()),
            AppError::BadRequest("bad multipart".to_string()),
        ];
        for err in errors {
            assert_eq!(err.http_status_code(), 400, "{:?}", err);
            assert!(!err.is_sensitive());
            assert_eq!(err.log_level(), LogLevel::Debug);
        }
    }

    #[test]
    fn test_no_files_message() {
        let err = AppError::NoFilesProvided;
        assert_eq!(err.client_message(), "no files provided");
        assert_eq!(err.error_code(), "NO_FILES_PROVIDED");
    }

    #[test]
    fn test_unsupported_format_names_value() {
        let err = AppError::UnsupportedFormat("ICO".to_string());
        assert!(err.client_message().contains("ICO"));
        assert_eq!(err.error_type(), "UnsupportedFormat");
    }

    #[test]
    fn test_no_images_converted_is_unprocessable() {
        let err = AppError::NoImagesConverted { attempted: 3 };
        assert_eq!(err.http_status_code(), 422);
        assert!(err.client_message().contains('3'));
    }

    #[test]
    fn test_internal_errors_are_sensitive() {
        let err = AppError::from(anyhow::anyhow!("zip writer failed"));
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_sensitive());
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("disk full").context("failed to finalize archive");
        let err = AppError::InternalWithSource {
            message: "archive".to_string(),
            source,
        };
        let details = err.detailed_message();
        assert!(details.contains("Caused by: failed to finalize archive"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::Other, "boom");
        match AppError::from(io_err) {
            AppError::Internal(msg) => assert!(msg.contains("boom")),
            other => panic!("Expected Internal variant, got {:?}", other),
        }
    }
}
