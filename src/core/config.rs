use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::core::CompressionSettings;
use crate::utils::{CompressorError, CompressorResult, ValidationError, validate_settings};

/// Intake ceiling per file: 10 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Name of the bundle produced by "download all".
pub const DEFAULT_ARCHIVE_NAME: &str = "compressed-images.zip";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Largest file accepted at intake, inclusive
    pub max_file_bytes: u64,
    pub archive_name: String,
    pub compression: CompressionSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            compression: CompressionSettings::default(),
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> CompressorResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CompressorError::io(format!("Failed to read config {}: {}", path.display(), e)))?;

        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ValidationError::settings(format!("Invalid config {}: {}", path.display(), e)))?;
        config.validate()?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> CompressorResult<()> {
        if self.max_file_bytes == 0 {
            return Err(ValidationError::settings("maxFileBytes cannot be 0").into());
        }
        if self.archive_name.trim().is_empty() {
            return Err(ValidationError::settings("archiveName cannot be empty").into());
        }
        validate_settings(&self.compression)
    }
}
