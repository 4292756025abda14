//! Target format whitelist

use image::ImageFormat;
use pixshift_core::AppError;
use std::fmt;
use std::str::FromStr;

/// Output format for converted images. Closed set: anything else is rejected
/// at option resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
    Bmp,
    Tiff,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 6] = [
        TargetFormat::Png,
        TargetFormat::Jpeg,
        TargetFormat::WebP,
        TargetFormat::Gif,
        TargetFormat::Bmp,
        TargetFormat::Tiff,
    ];

    /// Canonical upper-case name, as accepted in the `format` form field
    pub fn name(self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG",
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::WebP => "WEBP",
            TargetFormat::Gif => "GIF",
            TargetFormat::Bmp => "BMP",
            TargetFormat::Tiff => "TIFF",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpg",
            TargetFormat::WebP => "webp",
            TargetFormat::Gif => "gif",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Tiff => "tiff",
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            TargetFormat::Png => "image/png",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::WebP => "image/webp",
            TargetFormat::Gif => "image/gif",
            TargetFormat::Bmp => "image/bmp",
            TargetFormat::Tiff => "image/tiff",
        }
    }

    pub fn to_image_format(self) -> ImageFormat {
        match self {
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::WebP => ImageFormat::WebP,
            TargetFormat::Gif => ImageFormat::Gif,
            TargetFormat::Bmp => ImageFormat::Bmp,
            TargetFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

impl FromStr for TargetFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        TargetFormat::ALL
            .into_iter()
            .find(|f| f.name() == normalized)
            .ok_or_else(|| AppError::UnsupportedFormat(s.trim().to_string()))
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
