//! Image operations module
//!
//! This module provides the building blocks of a conversion:
//! - EXIF orientation and manual rotate/flip (orientation)
//! - Percentage, exact and aspect-fit resizing (resize)
//! - Per-format encoding with quality handling (encoder)

pub mod encoder;
pub mod orientation;
pub mod resize;

pub use encoder::FormatEncoder;
pub use orientation::ImageOrientation;
pub use resize::ImageResize;
