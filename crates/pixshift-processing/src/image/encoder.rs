use crate::format::TargetFormat;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage};
use std::io::Cursor;

/// Upper bound on encoded output size, in pixels
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// Per-format encoding with the shared quality knob
pub struct FormatEncoder;

impl FormatEncoder {
    /// Encode `img` into `format`. `quality` is in `[1, 100]`; it drives the
    /// lossy encoders and the PNG compression effort, and is ignored otherwise.
    pub fn encode(img: &DynamicImage, format: TargetFormat, quality: u8) -> Result<Bytes> {
        let (width, height) = img.dimensions();
        Self::ensure_within_pixel_limit(width, height)?;

        let data = match format {
            TargetFormat::Png => Self::encode_png(img, quality)?,
            TargetFormat::Jpeg => Self::encode_jpeg(img, quality)?,
            TargetFormat::WebP => Self::encode_webp(img, quality)?,
            TargetFormat::Gif => {
                Self::write(&DynamicImage::ImageRgba8(img.to_rgba8()), ImageFormat::Gif)?
            }
            TargetFormat::Bmp => Self::write(
                &DynamicImage::ImageRgb8(flatten_on_white(img)),
                ImageFormat::Bmp,
            )?,
            TargetFormat::Tiff => Self::write(
                &DynamicImage::ImageRgb8(flatten_on_white(img)),
                ImageFormat::Tiff,
            )?,
        };

        tracing::debug!(
            format = %format,
            quality = quality,
            width = width,
            height = height,
            output_size = data.len(),
            "Encoded image"
        );

        Ok(data)
    }

    pub fn ensure_within_pixel_limit(width: u32, height: u32) -> Result<()> {
        if width as u64 * height as u64 > MAX_OUTPUT_PIXELS {
            return Err(anyhow!(
                "output of {}x{} exceeds the {} pixel limit",
                width,
                height,
                MAX_OUTPUT_PIXELS
            ));
        }
        Ok(())
    }

    /// zlib level for PNG: 9 at the lowest quality down to 0 at the highest
    pub fn png_compression_level(quality: u8) -> u8 {
        let level = 9 - (quality as f32 / 11.12).floor() as i32;
        level.clamp(0, 9) as u8
    }

    fn png_compression_type(quality: u8) -> CompressionType {
        match Self::png_compression_level(quality) {
            0..=3 => CompressionType::Fast,
            4..=6 => CompressionType::Default,
            _ => CompressionType::Best,
        }
    }

    fn encode_png(img: &DynamicImage, quality: u8) -> Result<Bytes> {
        let mut buffer = Vec::new();
        let encoder = PngEncoder::new_with_quality(
            &mut buffer,
            Self::png_compression_type(quality),
            FilterType::Adaptive,
        );
        img.write_with_encoder(encoder)?;
        Ok(Bytes::from(buffer))
    }

    fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes> {
        let rgb = flatten_on_white(img);
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, quality).encode_image(&rgb)?;
        Ok(Bytes::from(buffer))
    }

    fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Bytes> {
        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba, width, height);
        let webp_data = encoder
            .encode_simple(false, quality as f32)
            .map_err(|e| anyhow!("WebP encoding failed: {:?}", e))?;

        Ok(Bytes::copy_from_slice(&webp_data))
    }

    fn write(img: &DynamicImage, format: ImageFormat) -> Result<Bytes> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format)?;
        Ok(Bytes::from(buffer))
    }
}

/// Composite any alpha over a white background and drop the channel
pub fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let a = a as u16;
            ((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
