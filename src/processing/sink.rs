//! Destinations for "download" requests.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::utils::{CompressorError, CompressorResult};

/// Hands a finished blob to the platform for saving.
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Saves `bytes` under `name` and returns where they ended up.
    async fn save(&self, name: &str, bytes: &[u8]) -> CompressorResult<PathBuf>;
}

/// Saves into a directory on disk, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SaveSink for DirectorySink {
    async fn save(&self, name: &str, bytes: &[u8]) -> CompressorResult<PathBuf> {
        // Only the final component is honoured so a name cannot escape `dir`
        let file_name = Path::new(name)
            .file_name()
            .ok_or_else(|| CompressorError::io(format!("Invalid file name: {name:?}")))?;

        fs::create_dir_all(&self.dir).await.map_err(|e| {
            CompressorError::io(format!("Cannot create output directory {}: {}", self.dir.display(), e))
        })?;

        let path = self.dir.join(file_name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| CompressorError::io(format!("Failed to write {}: {}", path.display(), e)))?;

        debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
