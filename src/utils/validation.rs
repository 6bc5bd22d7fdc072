use crate::core::{CompressionSettings, ImageFile};
use crate::utils::{CompressorResult, ValidationError};

/// Accepted declared-type prefix.
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// Validates an incoming batch as a whole.
///
/// All-or-nothing: the first offending file rejects the batch. The type check
/// covers the full batch before any size is looked at.
pub fn validate_batch(files: &[ImageFile], max_file_bytes: u64) -> CompressorResult<()> {
    if let Some(file) = files.iter().find(|f| !f.mime_type().starts_with(IMAGE_MIME_PREFIX)) {
        return Err(ValidationError::not_an_image(file.name(), file.mime_type()).into());
    }

    if let Some(file) = files.iter().find(|f| f.size() > max_file_bytes) {
        return Err(ValidationError::too_large(file.name(), file.size(), max_file_bytes).into());
    }

    Ok(())
}

/// Validates compression settings
pub fn validate_settings(settings: &CompressionSettings) -> CompressorResult<()> {
    validate_max_size_mb(settings.max_size_mb)?;
    validate_initial_quality(settings.initial_quality)?;
    Ok(())
}

pub fn validate_max_size_mb(max_size_mb: f64) -> CompressorResult<()> {
    if !max_size_mb.is_finite() || max_size_mb <= 0.0 {
        return Err(ValidationError::settings(
            format!("Invalid max size: {max_size_mb} MB. Must be greater than 0")
        ).into());
    }
    Ok(())
}

pub fn validate_initial_quality(quality: f64) -> CompressorResult<()> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(ValidationError::settings(
            format!("Invalid quality value: {quality}. Must be in (0, 1]")
        ).into());
    }
    Ok(())
}

/// Validates a slider percentage and converts it to a `(0, 1]` quality.
pub fn quality_from_percent(percent: u32) -> CompressorResult<f64> {
    if percent == 0 || percent > 100 {
        return Err(ValidationError::settings(
            format!("Invalid quality value: {percent}. Must be between 1 and 100")
        ).into());
    }
    Ok(f64::from(percent) / 100.0)
}
