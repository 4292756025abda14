//! Conversion options: raw form strings in, validated options out
//!
//! Every failure here is reported except one: quality is clamped into
//! `[1, 100]` rather than rejected.

use crate::format::TargetFormat;
use pixshift_core::AppError;

/// Quality used when the field is absent or not an integer
pub const DEFAULT_QUALITY: u8 = 85;

const MIN_QUALITY: i64 = 1;
const MAX_QUALITY: i64 = 100;

/// Raw, unvalidated form field values as they arrived in the request
#[derive(Debug, Clone, Default)]
pub struct RawConversionOptions {
    pub format: Option<String>,
    pub quality: Option<String>,
    pub resize_mode: Option<String>,
    pub percentage: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub preserve_aspect: Option<String>,
    pub rotate: Option<String>,
    pub flip_horizontal: Option<String>,
    pub flip_vertical: Option<String>,
}

/// How the output dimensions are derived from the (oriented) source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeMode {
    None,
    /// Scale both sides by `pct / 100`
    Percentage(f64),
    /// Exact target size; stretches unless `preserve_aspect` is set
    Dimensions {
        width: u32,
        height: u32,
        preserve_aspect: bool,
    },
}

/// Lossless rotate/flip applied after EXIF orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualTransforms {
    pub rotate: Option<u16>,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl ManualTransforms {
    pub fn is_identity(&self) -> bool {
        self.rotate.is_none() && !self.flip_horizontal && !self.flip_vertical
    }

    /// Parse the transform fields. Unknown rotation angles are ignored.
    pub fn from_raw(
        rotate: Option<&str>,
        flip_horizontal: Option<&str>,
        flip_vertical: Option<&str>,
    ) -> Self {
        let rotate = rotate
            .and_then(|r| r.trim().parse::<u16>().ok())
            .filter(|angle| matches!(angle, 90 | 180 | 270));

        Self {
            rotate,
            flip_horizontal: is_true(flip_horizontal),
            flip_vertical: is_true(flip_vertical),
        }
    }
}

/// Canonical, fully validated options shared by every image of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub target_format: TargetFormat,
    /// Always within `[1, 100]`
    pub quality: u8,
    pub resize: ResizeMode,
    pub transforms: ManualTransforms,
}

impl ConversionOptions {
    pub fn new(target_format: TargetFormat) -> Self {
        Self {
            target_format,
            quality: DEFAULT_QUALITY,
            resize: ResizeMode::None,
            transforms: ManualTransforms::default(),
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(MIN_QUALITY as u8, MAX_QUALITY as u8);
        self
    }

    pub fn with_resize(mut self, resize: ResizeMode) -> Self {
        self.resize = resize;
        self
    }

    pub fn with_transforms(mut self, transforms: ManualTransforms) -> Self {
        self.transforms = transforms;
        self
    }
}

/// Validates raw form values into [`ConversionOptions`]
#[derive(Debug, Clone, Copy)]
pub struct OptionResolver {
    default_quality: u8,
}

impl Default for OptionResolver {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
        }
    }
}

impl OptionResolver {
    pub fn new(default_quality: u8) -> Self {
        Self {
            default_quality: clamp_quality(default_quality as i64),
        }
    }

    pub fn resolve(&self, raw: &RawConversionOptions) -> Result<ConversionOptions, AppError> {
        let target_format = match non_blank(raw.format.as_deref()) {
            Some(value) => value.parse::<TargetFormat>()?,
            None => TargetFormat::Png,
        };

        let quality = self.resolve_quality(raw.quality.as_deref());
        let resize = resolve_resize(raw)?;
        let transforms = ManualTransforms::from_raw(
            raw.rotate.as_deref(),
            raw.flip_horizontal.as_deref(),
            raw.flip_vertical.as_deref(),
        );

        tracing::debug!(
            target_format = %target_format,
            quality = quality,
            resize = ?resize,
            transforms = ?transforms,
            "Resolved conversion options"
        );

        Ok(ConversionOptions {
            target_format,
            quality,
            resize,
            transforms,
        })
    }

    fn resolve_quality(&self, raw: Option<&str>) -> u8 {
        raw.and_then(|q| q.trim().parse::<i64>().ok())
            .map(clamp_quality)
            .unwrap_or(self.default_quality)
    }
}

fn clamp_quality(value: i64) -> u8 {
    value.clamp(MIN_QUALITY, MAX_QUALITY) as u8
}

fn resolve_resize(raw: &RawConversionOptions) -> Result<ResizeMode, AppError> {
    let mode = non_blank(raw.resize_mode.as_deref())
        .map(|m| m.to_lowercase())
        .unwrap_or_else(|| "none".to_string());

    match mode.as_str() {
        "none" => Ok(ResizeMode::None),
        "percentage" | "percent" => {
            let pct = non_blank(raw.percentage.as_deref())
                .and_then(|p| p.parse::<f64>().ok())
                .filter(|p| p.is_finite() && *p > 0.0)
                .ok_or_else(|| {
                    AppError::InvalidResizeParameter(format!(
                        "percentage must be a positive number, got '{}'",
                        raw.percentage.as_deref().unwrap_or("")
                    ))
                })?;
            Ok(ResizeMode::Percentage(pct))
        }
        "dimensions" | "exact" => {
            let width = parse_positive_dimension("width", raw.width.as_deref())?;
            let height = parse_positive_dimension("height", raw.height.as_deref())?;
            Ok(ResizeMode::Dimensions {
                width,
                height,
                preserve_aspect: is_true(raw.preserve_aspect.as_deref()),
            })
        }
        other => Err(AppError::InvalidResizeParameter(format!(
            "unknown resize_mode '{}', expected none, percentage or dimensions",
            other
        ))),
    }
}

fn parse_positive_dimension(name: &str, raw: Option<&str>) -> Result<u32, AppError> {
    non_blank(raw)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            AppError::InvalidResizeParameter(format!(
                "{} must be a positive integer, got '{}'",
                name,
                raw.unwrap_or("")
            ))
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_true(value: Option<&str>) -> bool {
    value
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "on"))
        .unwrap_or(false)
}
