use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use pixshift_core::AppError;
use pixshift_processing::{generate_preview, ConversionError};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_preview_request;

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewResponse {
    pub success: bool,
    /// PNG thumbnail as a `data:image/png;base64,...` URL
    pub preview: String,
    pub dimensions: PreviewDimensions,
}

/// Preview an image with orientation and manual transforms applied
#[utoipa::path(
    post,
    path = "/api/preview",
    tag = "convert",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Fields: file, rotate, flip_horizontal, flip_vertical"
    ),
    responses(
        (status = 200, description = "Preview generated", body = PreviewResponse),
        (status = 400, description = "Missing or undecodable image", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "preview_image"))]
pub async fn preview_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, HttpAppError> {
    let (upload, transforms) =
        extract_preview_request(multipart, state.config.max_file_size_bytes).await?;
    let max_dimension = state.config.preview_max_dimension;
    let filename = upload.filename.clone();

    let preview = tokio::task::spawn_blocking(move || {
        generate_preview(&upload.data, &transforms, max_dimension)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to spawn blocking task");
        AppError::Internal(e.to_string())
    })?
    .map_err(|e| match e {
        ConversionError::Decode(msg) => {
            AppError::BadRequest(format!("Could not read image '{}': {}", filename, msg))
        }
        ConversionError::Encode(msg) => AppError::Internal(msg),
    })?;

    tracing::debug!(
        width = preview.width,
        height = preview.height,
        "Generated preview"
    );

    Ok(Json(PreviewResponse {
        success: true,
        preview: preview.data_url,
        dimensions: PreviewDimensions {
            width: preview.width,
            height: preview.height,
        },
    }))
}
