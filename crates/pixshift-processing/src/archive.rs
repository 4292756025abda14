use crate::converter::{ConvertedImage, DEFAULT_STEM};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// Download name of the multi-file response
pub const ARCHIVE_FILENAME: &str = "converted_images.zip";

/// Sanitize filename for archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
fn sanitize_archive_filename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(DEFAULT_STEM)
        .to_string()
}

/// `name.ext` -> `name_1.ext`, `name_2.ext`, ... until unused
fn unique_entry_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
        _ => (name.clone(), String::new()),
    };

    let mut counter = 1;
    loop {
        let candidate = format!("{}_{}{}", stem, counter, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Create a ZIP archive holding every converted image, in order
pub fn create_zip_archive(images: &[ConvertedImage]) -> Result<Vec<u8>> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let mut used = HashSet::with_capacity(images.len());
        for image in images {
            let entry_name = unique_entry_name(sanitize_archive_filename(&image.filename), &mut used);

            zip.start_file(entry_name.as_str(), options)
                .with_context(|| format!("Failed to add file to ZIP: {}", entry_name))?;
            zip.write_all(&image.data)
                .with_context(|| format!("Failed to write file data to ZIP: {}", entry_name))?;
        }

        zip.finish().context("Failed to finalize ZIP archive")?;
    }

    tracing::debug!(
        entries = images.len(),
        size = buffer.len(),
        "Created ZIP archive"
    );

    Ok(buffer)
}
