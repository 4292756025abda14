//! Test fixtures: in-memory images and encoded blobs.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Image whose left half is red and right half is blue
pub fn two_tone_image(width: u32, height: u32) -> DynamicImage {
    let buf = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    DynamicImage::ImageRgba8(buf)
}

/// Solid image with a partially transparent pixel in the top-left corner
pub fn translucent_image(width: u32, height: u32) -> DynamicImage {
    let mut buf = RgbaImage::from_pixel(width, height, Rgba([0, 128, 0, 255]));
    buf.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
    DynamicImage::ImageRgba8(buf)
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .expect("Failed to encode fixture");
    buffer
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&two_tone_image(width, height), ImageFormat::Png)
}

/// Encode `img` as JPEG and splice in an APP1 EXIF segment carrying `orientation`
pub fn jpeg_with_orientation(img: &DynamicImage, orientation: u16) -> Vec<u8> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 95)
        .encode_image(&img.to_rgb8())
        .expect("Failed to encode JPEG fixture");

    // Big-endian TIFF header, one IFD with a single SHORT Orientation entry
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut payload = b"Exif\x00\x00".to_vec();
    payload.extend_from_slice(&tiff);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(&payload);

    // Right after SOI
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}
