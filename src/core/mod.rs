//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the application:
//! - [`AppState`]: pending/compressed lists, flags and settings behind one handle
//! - [`ImageFile`]: an opaque named image blob
//! - [`CompressionSettings`]: options applied to every file of a run
//! - [`StateObserver`]: how a UI layer hears about changes
//! - [`Progress`]: per-file progress of a compression run

mod config;
mod file_list;
mod observer;
mod progress;
mod state;
mod types;

pub use config::{AppConfig, DEFAULT_ARCHIVE_NAME, DEFAULT_MAX_FILE_BYTES};
pub use file_list::FileList;
pub use observer::{ObserverId, StateEvent, StateObserver};
pub use progress::{Progress, ProgressType};
pub use state::AppState;
pub use types::{CompressOutcome, CompressionSettings, CompressionSummary, FileSummary, ImageFile};
