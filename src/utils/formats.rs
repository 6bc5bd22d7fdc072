use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::CompressorError;

/// MIME type used when an extension is not a known image type.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    WebP,
    GIF,
    BMP,
    AVIF,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 6] = [
        Self::JPEG,
        Self::PNG,
        Self::WebP,
        Self::GIF,
        Self::BMP,
        Self::AVIF,
    ];

    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::JPEG => &["jpg", "jpeg"],
            Self::PNG => &["png"],
            Self::WebP => &["webp"],
            Self::GIF => &["gif"],
            Self::BMP => &["bmp"],
            Self::AVIF => &["avif"],
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::JPEG => "image/jpeg",
            Self::PNG => "image/png",
            Self::WebP => "image/webp",
            Self::GIF => "image/gif",
            Self::BMP => "image/bmp",
            Self::AVIF => "image/avif",
        }
    }

    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::JPEG),
            "image/png" => Some(Self::PNG),
            "image/webp" => Some(Self::WebP),
            "image/gif" => Some(Self::GIF),
            "image/bmp" => Some(Self::BMP),
            "image/avif" => Some(Self::AVIF),
            _ => None,
        }
    }

    /// Whether the encoder honours a quality setting for this format
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::JPEG)
    }
}

impl FromStr for ImageFormat {
    type Err = CompressorError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
            .ok_or_else(|| CompressorError::format(format!(
                "Unsupported image format: {}", ext
            )))
    }
}

/// Derives a MIME type from a file name's extension.
///
/// Unknown or missing extensions map to [`FALLBACK_MIME_TYPE`], which the
/// intake check then rejects.
pub fn mime_type_from_name(name: &str) -> &'static str {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| ImageFormat::from_str(ext).ok())
        .map(|format| format.mime_type())
        .unwrap_or(FALLBACK_MIME_TYPE)
}

/// Human-readable byte count: `"0 Bytes"`, `"1.5 KB"`, `"1 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    const K: f64 = 1024.0;

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && exponent < UNITS.len() - 1 {
        scaled /= 1024;
        exponent += 1;
    }

    let value = (bytes as f64 / K.powi(exponent as i32) * 100.0).round() / 100.0;

    // f64 Display drops trailing zeros ("1.5", "1")
    format!("{} {}", value, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(10 * 1024 * 1024 * 1024), "10 GB");
    }

    #[test]
    fn test_sizes_beyond_gb_stay_in_gb() {
        assert_eq!(format_file_size(2 * 1024 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_mime_type_from_name() {
        assert_eq!(mime_type_from_name("photo.JPG"), "image/jpeg");
        assert_eq!(mime_type_from_name("icon.png"), "image/png");
        assert_eq!(mime_type_from_name("notes.txt"), FALLBACK_MIME_TYPE);
        assert_eq!(mime_type_from_name("README"), FALLBACK_MIME_TYPE);
    }

    #[test]
    fn test_only_jpeg_is_lossy() {
        assert!(ImageFormat::JPEG.is_lossy());
        assert!(!ImageFormat::PNG.is_lossy());
        assert!(!ImageFormat::WebP.is_lossy());
    }
}
