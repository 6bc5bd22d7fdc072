//! Size-targeted image compression.
//!
//! [`ImageCompressor`] is the seam the state layer compresses through;
//! [`NativeCompressor`] implements it with the `image` crate. Output keeps the
//! input's format. Quality (JPEG only) and dimensions are stepped down until
//! the encoded size fits the configured ceiling or the iteration budget runs
//! out.

use std::io::Cursor;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::core::{CompressionSettings, ImageFile};
use crate::utils::{CompressorError, CompressorResult, ImageFormat, validate_settings};

/// Re-encode attempts after the first one.
const MAX_ITERATIONS: u32 = 10;
/// Per-iteration multiplier for quality and for each dimension.
const STEP_FACTOR: f64 = 0.95;

/// Turns one image into a smaller one.
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(
        &self,
        file: &ImageFile,
        settings: &CompressionSettings,
    ) -> CompressorResult<ImageFile>;
}

/// Compressor backed by the `image` crate's JPEG, PNG and WebP codecs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCompressor;

impl NativeCompressor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageCompressor for NativeCompressor {
    async fn compress(
        &self,
        file: &ImageFile,
        settings: &CompressionSettings,
    ) -> CompressorResult<ImageFile> {
        if !settings.off_thread {
            return compress_image(file, settings);
        }

        let file = file.clone();
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || compress_image(&file, &settings)).await?
    }
}

/// Compresses one image synchronously.
pub fn compress_image(file: &ImageFile, settings: &CompressionSettings) -> CompressorResult<ImageFile> {
    validate_settings(settings)?;

    let (source_format, format) = detect_format(file)?;
    let decoded = image::load_from_memory_with_format(file.bytes(), source_format)?;
    let max_bytes = settings.max_size_bytes();
    let (width, height) = (decoded.width(), decoded.height());

    let mut quality = settings.initial_quality;
    let mut encoded = encode(&decoded, source_format, quality)?;
    let mut iteration = 0;

    while encoded.len() as u64 > max_bytes && iteration < MAX_ITERATIONS {
        iteration += 1;
        if format.is_lossy() {
            quality *= STEP_FACTOR;
        }

        let scale = STEP_FACTOR.powi(iteration as i32);
        let scaled_width = ((f64::from(width) * scale) as u32).max(1);
        let scaled_height = ((f64::from(height) * scale) as u32).max(1);
        let resized = decoded.resize_exact(scaled_width, scaled_height, FilterType::Triangle);

        encoded = encode(&resized, source_format, quality)?;
        debug!(
            "'{}' pass {}: {}x{} q={:.2} -> {} bytes",
            file.name(), iteration, scaled_width, scaled_height, quality, encoded.len()
        );
    }

    if encoded.len() as u64 > max_bytes {
        debug!(
            "'{}' still above {} bytes after {} passes ({} bytes)",
            file.name(), max_bytes, MAX_ITERATIONS, encoded.len()
        );
    }

    // Re-encoding an already small file can make it bigger
    if file.size() <= max_bytes && encoded.len() as u64 >= file.size() {
        debug!("'{}' kept as is ({} bytes)", file.name(), file.size());
        return Ok(file.clone());
    }

    Ok(ImageFile::new(file.name(), format.mime_type(), encoded))
}

/// Sniffs the real container format; the declared MIME type is not trusted here.
fn detect_format(file: &ImageFile) -> CompressorResult<(image::ImageFormat, ImageFormat)> {
    let source = image::guess_format(file.bytes()).map_err(|e| {
        CompressorError::format(format!("Cannot identify '{}': {}", file.name(), e))
    })?;

    let format = match source {
        image::ImageFormat::Jpeg => ImageFormat::JPEG,
        image::ImageFormat::Png => ImageFormat::PNG,
        image::ImageFormat::WebP => ImageFormat::WebP,
        other => {
            return Err(CompressorError::format(format!(
                "Unsupported format for '{}': {:?}", file.name(), other
            )))
        }
    };

    Ok((source, format))
}

fn encode(img: &DynamicImage, format: image::ImageFormat, quality: f64) -> CompressorResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    match format {
        image::ImageFormat::Jpeg => {
            let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
            let encoder = JpegEncoder::new_with_quality(&mut buffer, q);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        image::ImageFormat::WebP => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut buffer, format)?;
        }
        _ => {
            img.write_to(&mut buffer, format)?;
        }
    }

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    /// Noisy RGB image encoded as JPEG at the given quality
    fn noisy_jpeg(size: u32, quality: u8) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        noisy_rgb(size).write_with_encoder(encoder).unwrap();
        buffer.into_inner()
    }

    fn tiny_png() -> Vec<u8> {
        let img = ImageBuffer::from_pixel(4, 4, Rgb([10u8, 20, 30]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn noisy_rgb(size: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(size, size, |x, y| {
            let v = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)).wrapping_mul(2_654_435_761);
            Rgb([(v >> 24) as u8, (v >> 16) as u8, (v >> 8) as u8])
        }))
    }

    fn encoded(img: &DynamicImage, format: image::ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    fn settings(max_size_mb: f64, off_thread: bool) -> CompressionSettings {
        CompressionSettings {
            max_size_mb,
            initial_quality: 0.8,
            off_thread,
        }
    }

    #[test]
    fn test_large_jpeg_shrinks() {
        let original = ImageFile::new("noise.jpg", "image/jpeg", noisy_jpeg(256, 100));
        let compressed = compress_image(&original, &settings(0.01, false)).unwrap();

        assert_eq!(compressed.name(), "noise.jpg");
        assert_eq!(compressed.mime_type(), "image/jpeg");
        assert!(compressed.size() < original.size());
        assert!(image::load_from_memory(compressed.bytes()).is_ok());
    }

    #[test]
    fn test_oversize_png_is_downscaled_and_stays_png() {
        let original = ImageFile::new("noise.png", "image/png", encoded(&noisy_rgb(300), image::ImageFormat::Png));
        let compressed = compress_image(&original, &settings(0.05, false)).unwrap();

        assert!(compressed.size() < original.size());
        assert_eq!(compressed.mime_type(), "image/png");
        assert_eq!(image::guess_format(compressed.bytes()).unwrap(), image::ImageFormat::Png);

        let decoded = image::load_from_memory(compressed.bytes()).unwrap();
        assert!(decoded.width() < 300 && decoded.height() < 300);
    }

    #[test]
    fn test_oversize_webp_is_downscaled_and_stays_webp() {
        let webp = encoded(&DynamicImage::ImageRgba8(noisy_rgb(300).to_rgba8()), image::ImageFormat::WebP);
        let original = ImageFile::new("noise.webp", "image/webp", webp);
        let compressed = compress_image(&original, &settings(0.05, false)).unwrap();

        assert!(compressed.size() < original.size());
        assert_eq!(compressed.mime_type(), "image/webp");
        assert_eq!(image::guess_format(compressed.bytes()).unwrap(), image::ImageFormat::WebP);

        let decoded = image::load_from_memory(compressed.bytes()).unwrap();
        assert!(decoded.width() < 300 && decoded.height() < 300);
    }

    #[test]
    fn test_small_file_is_not_grown() {
        let original = ImageFile::new("dot.png", "image/png", tiny_png());
        let compressed = compress_image(&original, &settings(1.0, false)).unwrap();

        assert!(compressed.size() <= original.size());
        assert_eq!(compressed.mime_type(), "image/png");
    }

    #[test]
    fn test_non_image_bytes_fail_with_format_error() {
        let file = ImageFile::new("fake.jpg", "image/jpeg", b"definitely not pixels".to_vec());
        let err = compress_image(&file, &settings(1.0, false)).unwrap_err();
        assert!(matches!(err, CompressorError::Format(_)));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let file = ImageFile::new("dot.png", "image/png", tiny_png());
        let err = compress_image(&file, &settings(0.0, false)).unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_off_thread_matches_inline() {
        let original = ImageFile::new("noise.jpg", "image/jpeg", noisy_jpeg(64, 95));
        let compressor = NativeCompressor::new();

        let inline = compressor.compress(&original, &settings(0.005, false)).await.unwrap();
        let off_thread = compressor.compress(&original, &settings(0.005, true)).await.unwrap();

        assert_eq!(inline, off_thread);
    }
}
