use crate::options::ManualTransforms;
use image::DynamicImage;
use std::io::Cursor;

/// Orientation value meaning "already upright"
pub const NORMAL_ORIENTATION: u8 = 1;

/// Image orientation operations (rotation and flipping)
pub struct ImageOrientation;

impl ImageOrientation {
    /// Read EXIF orientation tag from image data.
    ///
    /// Returns orientation value (1–8) or 1 (normal) if the container has no
    /// EXIF block, no orientation field, or an out-of-range value.
    pub fn read_exif_orientation(data: &[u8]) -> u8 {
        let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
            Ok(exif) => exif,
            Err(_) => return NORMAL_ORIENTATION,
        };

        exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .filter(|value| (1..=8).contains(value))
            .map(|value| value as u8)
            .unwrap_or(NORMAL_ORIENTATION)
    }

    /// Get rotation and flip operations needed for a given EXIF orientation.
    /// Returns (rotate_angle, flip_horizontal, flip_vertical); rotation is
    /// applied first, clockwise.
    pub fn get_orientation_transforms(orientation: u8) -> (Option<u16>, bool, bool) {
        match orientation {
            1 => (None, false, false),      // Normal
            2 => (None, true, false),       // Mirror horizontal
            3 => (Some(180), false, false), // Rotate 180
            4 => (None, false, true),       // Mirror vertical
            5 => (Some(90), true, false),   // Transpose
            6 => (Some(90), false, false),  // Rotate 90 CW
            7 => (Some(270), true, false),  // Transverse
            8 => (Some(270), false, false), // Rotate 270 CW
            _ => (None, false, false),      // Invalid, treat as normal
        }
    }

    /// Apply EXIF orientation correction to an image decoded from `data`
    pub fn apply_exif_orientation(img: DynamicImage, data: &[u8]) -> DynamicImage {
        let orientation = Self::read_exif_orientation(data);
        if orientation == NORMAL_ORIENTATION {
            return img;
        }

        let (rotate, flip_h, flip_v) = Self::get_orientation_transforms(orientation);

        tracing::debug!(
            orientation = orientation,
            rotate = ?rotate,
            flip_horizontal = flip_h,
            flip_vertical = flip_v,
            "Applying EXIF orientation"
        );

        Self::apply(img, rotate, flip_h, flip_v)
    }

    /// Apply the user-requested rotate/flip
    pub fn apply_manual(img: DynamicImage, transforms: &ManualTransforms) -> DynamicImage {
        if transforms.is_identity() {
            return img;
        }
        tracing::debug!(transforms = ?transforms, "Applying manual transforms");
        Self::apply(
            img,
            transforms.rotate,
            transforms.flip_horizontal,
            transforms.flip_vertical,
        )
    }

    fn apply(
        mut img: DynamicImage,
        rotate: Option<u16>,
        flip_h: bool,
        flip_v: bool,
    ) -> DynamicImage {
        if let Some(angle) = rotate {
            img = Self::rotate_by_angle(img, angle);
        }
        if flip_h {
            img = img.fliph();
        }
        if flip_v {
            img = img.flipv();
        }
        img
    }

    /// Rotate image by specified angle (90, 180, or 270 degrees clockwise).
    /// Pixel type is preserved.
    pub fn rotate_by_angle(img: DynamicImage, angle: u16) -> DynamicImage {
        match angle {
            90 => img.rotate90(),
            180 => img.rotate180(),
            270 => img.rotate270(),
            _ => img,
        }
    }
}
