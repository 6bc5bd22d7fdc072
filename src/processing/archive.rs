//! In-memory zip bundling of compressed files.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::ImageFile;
use crate::utils::{CompressorError, CompressorResult};

/// Zips `files` into a single buffer, one entry per file.
///
/// Entry names come from the file names; a repeated name gets a `-N` suffix
/// before its extension so no entry is overwritten.
pub fn build_archive(files: &[ImageFile]) -> CompressorResult<Vec<u8>> {
    if files.is_empty() {
        return Err(CompressorError::archive("Nothing to bundle"));
    }

    // Payloads are already-compressed images, so entries are stored as is
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    let names = unique_entry_names(files.iter().map(ImageFile::name));
    for (file, name) in files.iter().zip(names) {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(file.bytes())?;
        debug!("Bundled '{}' ({} bytes)", name, file.size());
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// [`build_archive`] on the blocking pool.
pub async fn build_archive_async(files: Vec<ImageFile>) -> CompressorResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || build_archive(&files))
        .await
        .map_err(|e| CompressorError::archive(format!("Archive task panicked: {e}")))?
}

/// Makes every name unique, keeping first occurrences untouched.
pub fn unique_entry_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.into_iter().collect();
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    let mut unique = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.to_string();
        let mut counter = 1;
        while used.contains(&candidate) {
            candidate = suffixed(name, counter);
            counter += 1;
        }
        used.insert(candidate.clone());
        unique.push(candidate);
    }

    unique
}

fn suffixed(name: &str, counter: usize) -> String {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-{counter}.{ext}"),
        None => format!("{stem}-{counter}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut entry = archive.by_index(i).unwrap();
                let mut contents = Vec::new();
                entry.read_to_end(&mut contents).unwrap();
                (entry.name().to_string(), contents)
            })
            .collect()
    }

    #[test]
    fn test_two_distinct_files_round_trip() {
        let files = vec![
            ImageFile::new("a.jpg", "image/jpeg", vec![1u8, 2, 3]),
            ImageFile::new("b.png", "image/png", vec![4u8, 5]),
        ];
        let entries = read_entries(build_archive(&files).unwrap());

        assert_eq!(entries, vec![
            ("a.jpg".to_string(), vec![1, 2, 3]),
            ("b.png".to_string(), vec![4, 5]),
        ]);
    }

    #[test]
    fn test_duplicate_names_are_suffixed() {
        let files = vec![
            ImageFile::new("a.jpg", "image/jpeg", vec![1u8]),
            ImageFile::new("a.jpg", "image/jpeg", vec![2u8]),
            ImageFile::new("a.jpg", "image/jpeg", vec![3u8]),
        ];
        let entries = read_entries(build_archive(&files).unwrap());
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(names, vec!["a.jpg", "a-1.jpg", "a-2.jpg"]);
        assert_eq!(entries[2].1, vec![3]);
    }

    #[test]
    fn test_suffix_skips_names_already_taken() {
        let names = unique_entry_names(["a-1.jpg", "a.jpg", "a.jpg", "README", "README"]);
        assert_eq!(names, vec!["a-1.jpg", "a.jpg", "a-2.jpg", "README", "README-1"]);
    }

    #[test]
    fn test_empty_bundle_is_an_error() {
        assert!(matches!(build_archive(&[]), Err(CompressorError::Archive(_))));
    }

    #[tokio::test]
    async fn test_async_build_matches_sync() {
        let files = vec![ImageFile::new("a.jpg", "image/jpeg", vec![9u8; 32])];
        let entries = read_entries(build_archive_async(files).await.unwrap());
        assert_eq!(entries[0].0, "a.jpg");
        assert_eq!(entries[0].1.len(), 32);
    }
}
