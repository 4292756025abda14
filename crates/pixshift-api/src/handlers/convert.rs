use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use pixshift_core::AppError;
use pixshift_processing::{
    convert_batch, create_zip_archive, BatchOutcome, ConversionOptions, ConvertedImage,
    UploadedImage, ARCHIVE_FILENAME,
};

use crate::constants::{CONVERTED_COUNT_HEADER, FAILED_COUNT_HEADER, ZIP_MIME_TYPE};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_conversion_request;

/// RFC 5987 `attr-char`: everything else is percent-encoded in `filename*`
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// What the response carries once the batch has run
#[derive(Debug)]
pub enum ConvertPayload {
    /// Exactly one upload, converted
    Single(ConvertedImage),
    /// Every success bundled, in upload order
    Archive {
        data: Vec<u8>,
        converted: usize,
        failed: usize,
    },
}

/// Convert uploaded images
///
/// Accepts one or more images in the `file`/`files` fields plus shared
/// conversion options. A single successful upload is returned as the raw file;
/// anything else is returned as a ZIP of the successes.
#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "convert",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Fields: file/files (one or more images), format, quality, resize_mode, percentage, width, height, preserve_aspect, rotate, flip_horizontal, flip_vertical"
    ),
    responses(
        (status = 200, description = "Converted image, or a ZIP archive for several files", content_type = "application/octet-stream"),
        (status = 400, description = "No files, unsupported format or invalid resize parameter", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "None of the uploaded images could be converted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "convert_images"))]
pub async fn convert_images(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let request = extract_conversion_request(multipart, state.upload_limits()).await?;

    // Request-level validation happens before any image is touched
    let options = state.option_resolver.resolve(&request.options)?;

    let uploads = request.files;
    let attempted = uploads.len();

    tracing::info!(
        files = attempted,
        target_format = %options.target_format,
        quality = options.quality,
        "Converting images"
    );

    let payload = tokio::task::spawn_blocking(move || run_conversion(&uploads, &options))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to spawn blocking task");
            AppError::Internal(e.to_string())
        })??;

    build_response(payload)
}

/// Run the batch and package its outcome. CPU-bound; call off the async runtime.
pub fn run_conversion(
    uploads: &[UploadedImage],
    options: &ConversionOptions,
) -> Result<ConvertPayload, AppError> {
    let outcome = convert_batch(uploads, options);
    package_outcome(outcome, uploads.len())
}

fn package_outcome(outcome: BatchOutcome, attempted: usize) -> Result<ConvertPayload, AppError> {
    if outcome.success_count() == 0 {
        return Err(AppError::NoImagesConverted { attempted });
    }

    if outcome.is_single_file() {
        let converted = outcome
            .into_successes()
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("single-file outcome without a result".to_string()))?;
        return Ok(ConvertPayload::Single(converted));
    }

    let failed = outcome.failure_count();
    let successes = outcome.into_successes();
    let converted = successes.len();
    let data = create_zip_archive(&successes)?;

    Ok(ConvertPayload::Archive {
        data,
        converted,
        failed,
    })
}

fn build_response(payload: ConvertPayload) -> Result<Response, HttpAppError> {
    let response = match payload {
        ConvertPayload::Single(converted) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, converted.mime_type)
            .header(
                header::CONTENT_DISPOSITION,
                attachment_disposition(&converted.filename),
            )
            .header(header::CONTENT_LENGTH, converted.data.len())
            .body(Body::from(converted.data)),
        ConvertPayload::Archive {
            data,
            converted,
            failed,
        } => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, ZIP_MIME_TYPE)
            .header(
                header::CONTENT_DISPOSITION,
                attachment_disposition(ARCHIVE_FILENAME),
            )
            .header(header::CONTENT_LENGTH, data.len())
            .header(CONVERTED_COUNT_HEADER, HeaderValue::from(converted))
            .header(FAILED_COUNT_HEADER, HeaderValue::from(failed))
            .body(Body::from(data)),
    };

    response.map_err(|e| {
        tracing::error!(error = %e, "Failed to build response");
        AppError::Internal(e.to_string()).into()
    })
}

/// `Content-Disposition` for a download named `filename`.
///
/// The quoted `filename` is an ASCII fallback with `"`, `\` and non-ASCII
/// characters replaced by `_`. When that differs from the real name, the
/// exact UTF-8 name follows as `filename*` (RFC 6266).
fn attachment_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(filename, ATTR_CHAR)
        )
    }
}
