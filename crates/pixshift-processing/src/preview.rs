//! Small PNG previews returned inline as data URLs

use crate::converter::ConversionError;
use crate::image::{FormatEncoder, ImageOrientation, ImageResize};
use crate::format::TargetFormat;
use crate::options::ManualTransforms;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::GenericImageView;

/// Quality handed to the PNG encoder for previews (fast compression)
const PREVIEW_QUALITY: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// `data:image/png;base64,...`
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// Decode `data`, orient and transform it, then shrink it so the longest side
/// is at most `max_dimension`. Smaller images keep their size.
pub fn generate_preview(
    data: &[u8],
    transforms: &ManualTransforms,
    max_dimension: u32,
) -> Result<Preview, ConversionError> {
    let img = image::load_from_memory(data).map_err(|e| ConversionError::Decode(e.to_string()))?;
    let img = ImageOrientation::apply_exif_orientation(img, data);
    let img = ImageOrientation::apply_manual(img, transforms);

    let (width, height) = img.dimensions();
    let img = if width.max(height) > max_dimension {
        let (new_width, new_height) =
            ImageResize::fit_within(width, height, max_dimension, max_dimension);
        img.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    let png = FormatEncoder::encode(&img, TargetFormat::Png, PREVIEW_QUALITY)
        .map_err(|e| ConversionError::Encode(e.to_string()))?;
    let (width, height) = img.dimensions();

    Ok(Preview {
        data_url: format!("data:image/png;base64,{}", STANDARD.encode(&png)),
        width,
        height,
    })
}
