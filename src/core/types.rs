//! Core types for image files, compression settings and results.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::utils::{ImageFormat, format_file_size};

/// An opaque image blob with a name and a declared MIME type.
///
/// Cloning shares the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Format implied by the declared MIME type, if it is a known image type
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            name: self.name.clone(),
            size: self.size(),
            mime_type: self.mime_type.clone(),
            size_label: format_file_size(self.size()),
        }
    }
}

/// Display projection of an [`ImageFile`] handed to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    /// e.g. "1.5 MB"
    pub size_label: String,
}

/// Options passed to the compressor for every file of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressionSettings {
    /// Target ceiling for each output, in MiB
    #[serde(rename = "maxSizeMB", alias = "maxSizeMb")]
    pub max_size_mb: f64,
    /// Starting quality in `(0, 1]`, lowered adaptively until the target fits
    pub initial_quality: f64,
    /// Run the encoder on the blocking pool instead of the async task
    pub off_thread: bool,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            max_size_mb: 1.0,
            initial_quality: 0.8,
            off_thread: true,
        }
    }
}

impl CompressionSettings {
    pub fn max_size_bytes(&self) -> u64 {
        (self.max_size_mb * 1024.0 * 1024.0) as u64
    }

    /// Quality slider position, 1-100
    pub fn quality_percent(&self) -> u32 {
        (self.initial_quality * 100.0).round() as u32
    }
}

/// Totals for a completed compression run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSummary {
    pub image_count: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    /// Bytes saved (can be negative if files grew)
    pub saved_bytes: i64,
    /// Saved bytes as a percentage of the input
    pub compression_ratio: f64,
    pub total_time_ms: u64,
}

impl CompressionSummary {
    pub fn from_files(inputs: &[ImageFile], outputs: &[ImageFile], total_time_ms: u64) -> Self {
        let total_input_bytes: u64 = inputs.iter().map(ImageFile::size).sum();
        let total_output_bytes: u64 = outputs.iter().map(ImageFile::size).sum();
        let saved_bytes = total_input_bytes as i64 - total_output_bytes as i64;
        let compression_ratio = if total_input_bytes > 0 {
            saved_bytes as f64 / total_input_bytes as f64 * 100.0
        } else {
            0.0
        };

        Self {
            image_count: outputs.len(),
            total_input_bytes,
            total_output_bytes,
            saved_bytes,
            compression_ratio,
            total_time_ms,
        }
    }
}

/// Result of a compress request.
#[derive(Debug, Clone)]
pub enum CompressOutcome {
    /// The compressed list was replaced
    Completed(CompressionSummary),
    /// Another run was still in flight; nothing happened
    AlreadyRunning,
    /// The run failed; the compressed list was left as it was
    Failed(crate::utils::CompressorError),
}
