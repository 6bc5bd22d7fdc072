//! Ordered, position-addressed list of image files.

use crate::core::{FileSummary, ImageFile};
use crate::utils::{CompressorError, CompressorResult};

/// Files addressed only by position. No deduplication, no identity tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    files: Vec<ImageFile>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageFile> {
        self.files.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageFile> {
        self.files.iter()
    }

    /// Appends a batch in arrival order.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = ImageFile>) {
        self.files.extend(batch);
    }

    /// Removes the entry at `index`, keeping the relative order of the rest.
    pub fn remove(&mut self, index: usize) -> CompressorResult<ImageFile> {
        if index >= self.files.len() {
            return Err(CompressorError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        Ok(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Swaps in a whole new set of files.
    pub fn replace(&mut self, files: Vec<ImageFile>) {
        self.files = files;
    }

    /// Copy of the current contents. Byte buffers are shared, not duplicated.
    pub fn snapshot(&self) -> Vec<ImageFile> {
        self.files.clone()
    }

    pub fn summaries(&self) -> Vec<FileSummary> {
        self.files.iter().map(ImageFile::summary).collect()
    }
}

impl From<Vec<ImageFile>> for FileList {
    fn from(files: Vec<ImageFile>) -> Self {
        Self { files }
    }
}
