//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pixshift API",
        version = "0.1.0",
        description = "Image conversion API. Upload one or more images with a target format, quality and optional resize; receive the converted file or a ZIP archive of all converted files."
    ),
    paths(
        handlers::convert::convert_images,
        handlers::preview::preview_image,
        handlers::health::health_check,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::preview::PreviewResponse,
        handlers::preview::PreviewDimensions,
    )),
    tags(
        (name = "convert", description = "Image conversion and preview"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Returns the OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
