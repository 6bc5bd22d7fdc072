//! Change notifications from [`AppState`](crate::core::AppState) to a UI layer.

use serde::Serialize;
use crate::core::{CompressionSettings, FileSummary};
use crate::core::progress::Progress;

/// Something the UI should re-render or show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum StateEvent {
    PendingChanged(Vec<FileSummary>),
    CompressedChanged(Vec<FileSummary>),
    ProcessingChanged(bool),
    DraggingChanged(bool),
    SettingsChanged(CompressionSettings),
    Progress(Progress),
    /// Blocking user-facing message (rejected intake, bad slider value)
    Alert(String),
}

/// Receives every [`StateEvent`].
///
/// Called synchronously from whichever task made the change, one event at a
/// time. List events arrive in the order the lists changed and carry the
/// whole list, not a diff, so the last one seen matches the current list.
/// Delivery holds the observer lock, so keep `on_event` short.
pub trait StateObserver: Send + Sync {
    fn on_event(&self, event: &StateEvent);
}

impl<F> StateObserver for F
where
    F: Fn(&StateEvent) + Send + Sync,
{
    fn on_event(&self, event: &StateEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);
