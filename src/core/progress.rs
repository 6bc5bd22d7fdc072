use serde::Serialize;
use crate::core::CompressionSummary;

/// Progress message type
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
    Error,
}

/// Progress of a compression run, sent to observers as files finish
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Progress type (start, progress, complete, error)
    pub progress_type: ProgressType,
    /// Number of completed files
    pub completed_tasks: usize,
    /// Total number of files in the run
    pub total_tasks: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// Name of the file this update is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Totals, set on the final update of a successful run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CompressionSummary>,
    /// Optional error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Progress {
    /// Create a new Progress instance with basic information
    pub fn new(
        progress_type: ProgressType,
        completed_tasks: usize,
        total_tasks: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };

        Self {
            progress_type,
            completed_tasks,
            total_tasks,
            progress_percentage,
            status: status.to_string(),
            file_name: None,
            summary: None,
            error: None,
        }
    }

    pub fn start(total_tasks: usize) -> Self {
        Self::new(
            ProgressType::Start,
            0,
            total_tasks,
            &format!("Compressing {total_tasks} file(s)"),
        )
    }

    /// One file finished.
    pub fn file_done(completed: usize, total: usize, file_name: &str, original: u64, compressed: u64) -> Self {
        let saved_kb = (original as f64 - compressed as f64) / 1024.0;
        let ratio = if original > 0 {
            (original as f64 - compressed as f64) / original as f64 * 100.0
        } else {
            0.0
        };

        let mut progress = Self::new(
            ProgressType::Progress,
            completed,
            total,
            &format!("{file_name} compressed ({saved_kb:.2} KB saved / {ratio:.0}% compression)"),
        );
        progress.file_name = Some(file_name.to_string());
        progress
    }

    pub fn complete(summary: CompressionSummary) -> Self {
        let total = summary.image_count;
        let mut progress = Self::new(ProgressType::Complete, total, total, "complete");
        progress.summary = Some(summary);
        progress
    }

    pub fn error(completed: usize, total: usize, file_name: Option<&str>, error: &str) -> Self {
        let mut progress = Self::new(ProgressType::Error, completed, total, "error");
        progress.file_name = file_name.map(str::to_string);
        progress.error = Some(error.to_string());
        progress
    }
}
