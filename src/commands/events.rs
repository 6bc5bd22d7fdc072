//! Handlers for the drop zone, file picker, list buttons and sliders.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use crate::core::{AppState, CompressOutcome};
use crate::processing::SaveSink;
use crate::utils::{CompressorError, load_image_files};

/// Logs a failure, or alerts the user when it is a validation rejection.
async fn report(state: &AppState, action: &str, err: CompressorError) {
    if err.is_validation() {
        warn!("{} rejected: {}", action, err);
        state.alert(err.to_string()).await;
    } else {
        error!("{} failed: {}", action, err);
    }
}

pub async fn on_drag_over(state: &AppState) {
    state.set_dragging(true).await;
}

pub async fn on_drag_leave(state: &AppState) {
    state.set_dragging(false).await;
}

/// Files dropped on the drop zone.
///
/// Returns whether the batch was accepted.
pub async fn on_drop<P: AsRef<Path>>(state: &AppState, paths: &[P]) -> bool {
    state.set_dragging(false).await;
    intake(state, paths).await
}

/// Files chosen through the file picker.
pub async fn on_files_selected<P: AsRef<Path>>(state: &AppState, paths: &[P]) -> bool {
    intake(state, paths).await
}

/// Any intake failure is shown to the user, unreadable paths included.
async fn intake<P: AsRef<Path>>(state: &AppState, paths: &[P]) -> bool {
    if paths.is_empty() {
        return false;
    }

    let result = match load_image_files(paths).await {
        Ok(files) => state.add_files(files).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(count) => {
            debug!("Intake accepted {} file(s), {} pending", paths.len(), count);
            true
        }
        Err(e) => {
            warn!("Intake rejected: {}", e);
            state.alert(e.to_string()).await;
            false
        }
    }
}

pub async fn on_remove_pending(state: &AppState, index: usize) {
    if let Err(e) = state.remove_pending(index).await {
        report(state, "Remove", e).await;
    }
}

pub async fn on_remove_compressed(state: &AppState, index: usize) {
    if let Err(e) = state.remove_compressed(index).await {
        report(state, "Remove", e).await;
    }
}

pub async fn on_clear_pending(state: &AppState) {
    state.clear_pending().await;
}

pub async fn on_clear_compressed(state: &AppState) {
    state.clear_compressed().await;
}

/// The "compress" button.
pub async fn on_compress(state: &AppState) -> CompressOutcome {
    let outcome = state.compress().await;
    match &outcome {
        CompressOutcome::Completed(summary) => {
            info!("Compression finished: {} file(s)", summary.image_count);
        }
        CompressOutcome::AlreadyRunning => {
            debug!("Compression already in progress");
        }
        // Logged where the run failed; the user only sees the list stay as it was
        CompressOutcome::Failed(_) => {}
    }
    outcome
}

pub async fn on_download_file(state: &AppState, index: usize, sink: &dyn SaveSink) -> Option<PathBuf> {
    match state.download_file(index, sink).await {
        Ok(path) => Some(path),
        Err(e) => {
            report(state, "Download", e).await;
            None
        }
    }
}

pub async fn on_download_all(state: &AppState, sink: &dyn SaveSink) -> Option<PathBuf> {
    match state.download_all(sink).await {
        Ok(path) => Some(path),
        Err(e) => {
            report(state, "Download all", e).await;
            None
        }
    }
}

/// Quality slider moved, 1-100.
pub async fn on_quality_change(state: &AppState, percent: u32) -> bool {
    match state.set_quality(percent).await {
        Ok(()) => true,
        Err(e) => {
            report(state, "Quality change", e).await;
            false
        }
    }
}

/// Size slider moved, in MiB.
pub async fn on_max_size_change(state: &AppState, max_size_mb: f64) -> bool {
    match state.set_max_size_mb(max_size_mb).await {
        Ok(()) => true,
        Err(e) => {
            report(state, "Max size change", e).await;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use crate::core::{AppConfig, StateEvent, StateObserver};

    async fn state_with_alerts() -> (AppState, Arc<Mutex<Vec<String>>>) {
        let state = AppState::new(AppConfig::default());
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&alerts);
        let observer: Arc<dyn StateObserver> = Arc::new(move |event: &StateEvent| {
            if let StateEvent::Alert(message) = event {
                sink.lock().unwrap().push(message.clone());
            }
        });
        state.subscribe(observer).await;
        (state, alerts)
    }

    #[tokio::test]
    async fn test_drop_of_non_image_alerts_and_keeps_list() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.jpg");
        let bad = dir.path().join("notes.txt");
        std::fs::write(&good, [1u8, 2]).unwrap();
        std::fs::write(&bad, [3u8]).unwrap();

        let (state, alerts) = state_with_alerts().await;
        on_drag_over(&state).await;
        assert!(state.is_dragging());

        assert!(!on_drop(&state, &[good, bad]).await);
        assert!(!state.is_dragging());
        assert!(state.pending().await.is_empty());

        let alerts = alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("notes.txt"));
    }

    #[tokio::test]
    async fn test_missing_path_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let (state, alerts) = state_with_alerts().await;

        assert!(!on_files_selected(&state, &[dir.path().join("gone.png")]).await);
        assert_eq!(alerts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_picker_accepts_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, [1u8]).unwrap();

        let (state, alerts) = state_with_alerts().await;
        assert!(on_files_selected(&state, &[&path, &path]).await);
        assert_eq!(state.pending().await.len(), 2);
        assert!(alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_slider_value_alerts() {
        let (state, alerts) = state_with_alerts().await;
        assert!(!on_quality_change(&state, 0).await);
        assert!(on_max_size_change(&state, 0.5).await);
        assert_eq!(alerts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bad_remove_index_is_logged_not_alerted() {
        let (state, alerts) = state_with_alerts().await;
        on_remove_pending(&state, 3).await;
        on_remove_compressed(&state, 0).await;
        assert!(alerts.lock().unwrap().is_empty());
    }
}
