use crate::options::ResizeMode;
use image::{DynamicImage, GenericImageView};

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Scale both sides by `pct / 100`, rounding half away from zero.
    /// Each side is at least 1 pixel.
    pub fn percentage_dimensions(width: u32, height: u32, pct: f64) -> (u32, u32) {
        let scale = |side: u32| -> u32 {
            let scaled = (side as f64 * pct / 100.0).round();
            if scaled >= u32::MAX as f64 {
                u32::MAX
            } else {
                (scaled as u32).max(1)
            }
        };
        (scale(width), scale(height))
    }

    /// Largest size with the source aspect ratio fitting inside
    /// `max_width × max_height`. Sides are floored, minimum 1.
    pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
        let (w, h) = (width.max(1) as u64, height.max(1) as u64);
        let (mw, mh) = (max_width as u64, max_height as u64);

        if w * mh > h * mw {
            // Wider than the box: width is the binding side
            let new_h = (h * mw / w).max(1);
            (max_width, new_h as u32)
        } else {
            let new_w = (w * mh / h).max(1);
            (new_w as u32, max_height)
        }
    }

    /// Target size for `mode`, or `None` when no resize is requested
    pub fn target_dimensions(width: u32, height: u32, mode: &ResizeMode) -> Option<(u32, u32)> {
        match *mode {
            ResizeMode::None => None,
            ResizeMode::Percentage(pct) => Some(Self::percentage_dimensions(width, height, pct)),
            ResizeMode::Dimensions {
                width: target_w,
                height: target_h,
                preserve_aspect,
            } => {
                if preserve_aspect {
                    Some(Self::fit_within(width, height, target_w, target_h))
                } else {
                    Some((target_w, target_h))
                }
            }
        }
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }

    /// Resize image to exact dimensions
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }

    /// Apply `mode` to `img`. Same-size targets skip resampling.
    pub fn apply(img: DynamicImage, mode: &ResizeMode) -> DynamicImage {
        let (width, height) = img.dimensions();
        match Self::target_dimensions(width, height, mode) {
            Some((new_width, new_height)) if (new_width, new_height) != (width, height) => {
                tracing::debug!(
                    from_width = width,
                    from_height = height,
                    to_width = new_width,
                    to_height = new_height,
                    "Resizing image"
                );
                Self::resize_image(&img, new_width, new_height)
            }
            _ => img,
        }
    }
}
