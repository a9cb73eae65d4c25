//! EXIF metadata decoding.
//!
//! The one entry point is [`decode`]: raw image bytes in, a
//! [`MetadataRecord`] out, or a [`DecodeError`] when the stream carries no
//! readable metadata. Camera strings are padding-trimmed, exposure values
//! keep their rational numerator/denominator form, and GPS coordinates are
//! converted from degrees/minutes/seconds to signed decimal degrees.

mod reader;

pub use reader::{decode, DecodeError, MetadataRecord, Rational};

use std::path::Path;

/// Extensions the decoder can read EXIF from.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg",
    "tif", "tiff",
    // HEIC/HEIF — metadata only, no pixel preview
    "heic", "heif",
];

/// Check if a file has a supported image extension.
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
