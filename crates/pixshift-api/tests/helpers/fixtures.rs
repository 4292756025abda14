//! Test fixtures: encoded images built in memory.
//!
//! Image builders come from `pixshift_processing::test_helpers` so the unit
//! and integration suites share one EXIF fixture.

use image::GenericImageView;
use pixshift_processing::test_helpers::{jpeg_with_orientation, png_bytes, two_tone_image};
use std::io::{Cursor, Read};

/// PNG whose left half is red and right half is blue
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    png_bytes(width, height)
}

pub fn create_corrupt_image() -> Vec<u8> {
    b"\x89PNG\r\n\x1a\nthis is not really a png".to_vec()
}

/// Two-tone JPEG carrying an EXIF Orientation tag
pub fn create_jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    jpeg_with_orientation(&two_tone_image(width, height), orientation)
}

pub fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
    image::load_from_memory(data)
        .expect("Response is not a decodable image")
        .dimensions()
}

/// (name, bytes) of every entry in a ZIP archive, in archive order
pub fn zip_entries(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).expect("Response is not a ZIP");
    (0..zip.len())
        .map(|i| {
            let mut file = zip.by_index(i).expect("Unreadable ZIP entry");
            let mut data = Vec::new();
            file.read_to_end(&mut data).expect("Unreadable ZIP entry");
            (file.name().to_string(), data)
        })
        .collect()
}
