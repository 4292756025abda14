//! Pixshift Image Conversion Library
//!
//! This crate turns uploaded images plus one shared set of conversion options
//! into per-file results, and packages batches into ZIP archives.
//!
//! The flow for one request is:
//! 1. [`OptionResolver`] validates raw form strings into [`ConversionOptions`]
//! 2. [`convert_batch`] runs [`ImageConverter`] over every upload, in order
//! 3. [`create_zip_archive`] bundles the successes when more than one file is returned

pub mod archive;
pub mod batch;
pub mod converter;
pub mod format;
pub mod image;
pub mod options;
pub mod preview;

/// In-memory image fixtures shared with the API crate's integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

// Re-export commonly used types
pub use archive::{create_zip_archive, ARCHIVE_FILENAME};
pub use batch::{convert_batch, BatchOutcome};
pub use converter::{
    ConversionError, ConversionResult, ConvertedImage, FailedImage, ImageConverter, UploadedImage,
};
pub use format::TargetFormat;
pub use self::image::{FormatEncoder, ImageOrientation, ImageResize};
pub use options::{
    ConversionOptions, ManualTransforms, OptionResolver, RawConversionOptions, ResizeMode,
    DEFAULT_QUALITY,
};
pub use preview::{generate_preview, Preview};
