//! Multipart ingestion for the conversion endpoints

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use pixshift_core::AppError;
use pixshift_processing::{ManualTransforms, RawConversionOptions, UploadedImage};

/// Name given to file parts that arrive without a filename
const DEFAULT_UPLOAD_NAME: &str = "image";

/// Size and count limits applied while reading the multipart stream
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub max_files: usize,
}

/// Everything a conversion request carried, before any validation
#[derive(Debug, Default)]
pub struct ConversionRequest {
    pub files: Vec<UploadedImage>,
    pub options: RawConversionOptions,
}

/// Read every part of a `/convert` request.
///
/// File parts are taken from the `file` and `files` fields in upload order;
/// recognised text fields fill [`RawConversionOptions`]. Unknown fields are
/// ignored.
pub async fn extract_conversion_request(
    mut multipart: Multipart,
    limits: UploadLimits,
) -> Result<ConversionRequest, AppError> {
    let mut request = ConversionRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" | "files" => {
                let filename = field.file_name().map(|s: &str| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;

                // Blank browser file input
                if data.is_empty() && filename.as_deref().map_or(true, str::is_empty) {
                    continue;
                }

                let filename = sanitize_filename(filename.as_deref().unwrap_or(""));
                validate_file_size(&filename, data.len(), limits.max_file_size)?;

                if request.files.len() >= limits.max_files {
                    return Err(AppError::BadRequest(format!(
                        "Too many files: at most {} images per request",
                        limits.max_files
                    )));
                }

                request.files.push(UploadedImage::new(data, filename));
            }
            _ => {
                let Some(slot) = option_slot(&mut request.options, &field_name) else {
                    tracing::debug!(field = %field_name, "Ignoring unknown form field");
                    continue;
                };
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read form field", e))?;
                *slot = Some(value);
            }
        }
    }

    if request.files.is_empty() {
        return Err(AppError::NoFilesProvided);
    }

    tracing::debug!(
        files = request.files.len(),
        total_bytes = request.files.iter().map(|f| f.data.len()).sum::<usize>(),
        "Read conversion request"
    );

    Ok(request)
}

/// Read a `/preview` request: the first `file` part plus the transform fields
pub async fn extract_preview_request(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<(UploadedImage, ManualTransforms), AppError> {
    let mut upload: Option<UploadedImage> = None;
    let mut options = RawConversionOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" if upload.is_none() => {
                let filename = sanitize_filename(field.file_name().unwrap_or(""));
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;
                validate_file_size(&filename, data.len(), max_file_size)?;
                if !data.is_empty() {
                    upload = Some(UploadedImage::new(data, filename));
                }
            }
            "rotate" | "flip_horizontal" | "flip_vertical" => {
                if let Some(slot) = option_slot(&mut options, &field_name) {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| multipart_error("Failed to read form field", e))?;
                    *slot = Some(value);
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or(AppError::NoFilesProvided)?;
    let transforms = ManualTransforms::from_raw(
        options.rotate.as_deref(),
        options.flip_horizontal.as_deref(),
        options.flip_vertical.as_deref(),
    );

    Ok((upload, transforms))
}

/// Body-limit violations surface as 413, everything else as a bad request
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, err.body_text()))
    } else {
        AppError::BadRequest(format!("{}: {}", context, err.body_text()))
    }
}

/// Map a form field name (including accepted aliases) to its option slot
fn option_slot<'a>(
    options: &'a mut RawConversionOptions,
    field_name: &str,
) -> Option<&'a mut Option<String>> {
    let slot = match field_name {
        "format" => &mut options.format,
        "quality" => &mut options.quality,
        "resize_mode" | "mode" => &mut options.resize_mode,
        "percentage" | "percent" => &mut options.percentage,
        "width" => &mut options.width,
        "height" => &mut options.height,
        "preserve_aspect" => &mut options.preserve_aspect,
        "rotate" => &mut options.rotate,
        "flip_horizontal" => &mut options.flip_horizontal,
        "flip_vertical" => &mut options.flip_vertical,
        _ => return None,
    };
    Some(slot)
}

/// Validate file size
pub fn validate_file_size(filename: &str, file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File '{}' exceeds maximum allowed size of {} MB",
            filename,
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Reduce a client-supplied filename to its base name.
///
/// Path components and control characters are dropped; everything else,
/// including spaces and non-ASCII letters, is kept. An empty result falls
/// back to `image`.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX_FILENAME_LENGTH: usize = 255;

    let filename_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILENAME_LENGTH)
        .collect();
    let sanitized = sanitized.trim();

    if sanitized.trim_matches('.').is_empty() {
        return DEFAULT_UPLOAD_NAME.to_string();
    }

    sanitized.to_string()
}
