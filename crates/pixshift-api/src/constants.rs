//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Number of images packed into a ZIP response
pub const CONVERTED_COUNT_HEADER: &str = "x-converted-count";

/// Number of uploads left out of a ZIP response because they failed
pub const FAILED_COUNT_HEADER: &str = "x-failed-count";

pub const ZIP_MIME_TYPE: &str = "application/zip";
