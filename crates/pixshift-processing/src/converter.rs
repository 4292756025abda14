//! Per-image conversion: decode, orient, transform, resize, encode
//!
//! A failure here is a value, never a panic or an early return for the batch.

use crate::format::TargetFormat;
use crate::image::{FormatEncoder, ImageOrientation, ImageResize};
use crate::options::ConversionOptions;
use bytes::Bytes;
use image::GenericImageView;
use thiserror::Error;

/// Filename stem used when the upload carries none
pub const DEFAULT_STEM: &str = "image";

/// One uploaded file, as read from the multipart request
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Bytes,
    pub filename: String,
}

impl UploadedImage {
    pub fn new(data: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub data: Bytes,
    pub filename: String,
    pub mime_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct FailedImage {
    pub original_filename: String,
    pub error: ConversionError,
}

/// Per-file error kinds. Isolated to the file that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),
}

impl ConversionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionError::Decode(_) => "decode",
            ConversionError::Encode(_) => "encode",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConversionResult {
    Success(ConvertedImage),
    Failure(FailedImage),
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }
}

pub struct ImageConverter;

impl ImageConverter {
    /// Run the full pipeline for one upload
    pub fn convert(upload: &UploadedImage, options: &ConversionOptions) -> ConversionResult {
        match Self::try_convert(upload, options) {
            Ok(converted) => ConversionResult::Success(converted),
            Err(error) => ConversionResult::Failure(FailedImage {
                original_filename: upload.filename.clone(),
                error,
            }),
        }
    }

    fn try_convert(
        upload: &UploadedImage,
        options: &ConversionOptions,
    ) -> Result<ConvertedImage, ConversionError> {
        let img = image::load_from_memory(&upload.data)
            .map_err(|e| ConversionError::Decode(e.to_string()))?;
        let (source_width, source_height) = img.dimensions();

        let img = ImageOrientation::apply_exif_orientation(img, &upload.data);
        let img = ImageOrientation::apply_manual(img, &options.transforms);

        let (oriented_width, oriented_height) = img.dimensions();
        if let Some((width, height)) =
            ImageResize::target_dimensions(oriented_width, oriented_height, &options.resize)
        {
            FormatEncoder::ensure_within_pixel_limit(width, height)
                .map_err(|e| ConversionError::Encode(e.to_string()))?;
        }
        let img = ImageResize::apply(img, &options.resize);

        let data = FormatEncoder::encode(&img, options.target_format, options.quality)
            .map_err(|e| ConversionError::Encode(e.to_string()))?;

        let (width, height) = img.dimensions();
        tracing::debug!(
            filename = %upload.filename,
            source_width = source_width,
            source_height = source_height,
            width = width,
            height = height,
            target_format = %options.target_format,
            "Converted image"
        );

        Ok(ConvertedImage {
            data,
            filename: output_filename(&upload.filename, options.target_format),
            mime_type: options.target_format.to_mime_type(),
        })
    }
}

/// Stem of `original` (text before the last `.`) plus the target extension
pub fn output_filename(original: &str, format: TargetFormat) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base,
    };
    let stem = if stem.is_empty() { DEFAULT_STEM } else { stem };
    format!("{}.{}", stem, format.extension())
}
