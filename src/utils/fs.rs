use std::path::Path;
use tokio::fs;
use crate::core::ImageFile;
use crate::utils::{CompressorError, CompressorResult, mime_type_from_name};

/// Reads a file from disk into an [`ImageFile`].
///
/// The MIME type is derived from the extension, the way a browser fills in
/// `File.type`; the bytes are not sniffed.
pub async fn load_image_file(path: impl AsRef<Path>) -> CompressorResult<ImageFile> {
    let path = path.as_ref();
    let name = extract_filename(path)?;

    let bytes = fs::read(path)
        .await
        .map_err(|e| CompressorError::io(format!("Failed to read {}: {}", path.display(), e)))?;

    let mime_type = mime_type_from_name(&name);
    Ok(ImageFile::new(name, mime_type, bytes))
}

/// Loads every path, failing on the first one that cannot be read.
pub async fn load_image_files<P: AsRef<Path>>(paths: &[P]) -> CompressorResult<Vec<ImageFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(load_image_file(path).await?);
    }
    Ok(files)
}

/// Final path component as an owned string.
pub fn extract_filename(path: &Path) -> CompressorResult<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CompressorError::io(
            format!("Path has no file name: {}", path.display())
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_image_file_uses_extension_for_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let file = load_image_file(&path).await.unwrap();
        assert_eq!(file.name(), "cat.png");
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.size(), 16);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image_file(dir.path().join("missing.jpg")).await.unwrap_err();
        assert!(matches!(err, CompressorError::IO(_)));
    }
}
