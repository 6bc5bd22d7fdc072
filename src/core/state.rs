//! Application state: the pending and compressed lists plus the flags the UI renders.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::core::config::AppConfig;
use crate::core::file_list::FileList;
use crate::core::observer::{ObserverId, StateEvent, StateObserver};
use crate::core::progress::Progress;
use crate::core::{CompressOutcome, CompressionSettings, CompressionSummary, ImageFile};
use crate::processing::{ImageCompressor, NativeCompressor, SaveSink, build_archive_async};
use crate::utils::validation::{validate_batch, validate_max_size_mb};
use crate::utils::{CompressorError, CompressorResult, quality_from_percent};

struct Lists {
    pending: FileList,
    compressed: FileList,
    settings: CompressionSettings,
}

type Observers = Vec<(ObserverId, Arc<dyn StateObserver>)>;

struct Inner {
    lists: Mutex<Lists>,
    // Held for the whole delivery of an event, so observers see one event at a time
    observers: Mutex<Observers>,
    next_observer_id: AtomicU64,
    processing: AtomicBool,
    dragging: AtomicBool,
    compressor: Arc<dyn ImageCompressor>,
    max_file_bytes: u64,
    archive_name: String,
}

/// Clears the processing flag even if the run panics.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// State holder handed to every event handler.
///
/// Cheap to clone; clones share the same lists. Compression runs on a snapshot
/// of the pending list taken when the run starts, so the pending list stays
/// editable while a run is in flight and those edits do not reach that run.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// Creates state backed by the native `image` crate compressor.
    pub fn new(config: AppConfig) -> Self {
        Self::with_compressor(config, Arc::new(NativeCompressor::new()))
    }

    pub fn with_compressor(config: AppConfig, compressor: Arc<dyn ImageCompressor>) -> Self {
        debug!(
            "AppState initialized (max file {} bytes, archive '{}')",
            config.max_file_bytes, config.archive_name
        );

        Self {
            inner: Arc::new(Inner {
                lists: Mutex::new(Lists {
                    pending: FileList::new(),
                    compressed: FileList::new(),
                    settings: config.compression,
                }),
                observers: Mutex::new(Vec::new()),
                next_observer_id: AtomicU64::new(0),
                processing: AtomicBool::new(false),
                dragging: AtomicBool::new(false),
                compressor,
                max_file_bytes: config.max_file_bytes,
                archive_name: config.archive_name,
            }),
        }
    }

    // ── Observers ────────────────────────────────────────────────────────────────────

    pub async fn subscribe(&self, observer: Arc<dyn StateObserver>) -> ObserverId {
        let id = ObserverId(self.inner.next_observer_id.fetch_add(1, Ordering::Relaxed));
        self.inner.observers.lock().await.push((id, observer));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub async fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.lock().await;
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    async fn notify(&self, event: StateEvent) {
        let observers = self.inner.observers.lock().await;
        deliver(&observers, &event);
    }

    /// Delivers the event for a change made under `lists`.
    ///
    /// The observer lock is taken before `lists` is released, so list events
    /// reach observers in the order the changes were made.
    async fn publish(&self, lists: MutexGuard<'_, Lists>, event: StateEvent) {
        let observers = self.inner.observers.lock().await;
        drop(lists);
        deliver(&observers, &event);
    }

    /// Pushes a user-facing message to observers.
    pub async fn alert(&self, message: impl Into<String>) {
        self.notify(StateEvent::Alert(message.into())).await;
    }

    // ── Reads ────────────────────────────────────────────────────────────────────────

    pub async fn pending(&self) -> Vec<ImageFile> {
        self.inner.lists.lock().await.pending.snapshot()
    }

    pub async fn compressed(&self) -> Vec<ImageFile> {
        self.inner.lists.lock().await.compressed.snapshot()
    }

    pub async fn settings(&self) -> CompressionSettings {
        self.inner.lists.lock().await.settings.clone()
    }

    pub fn is_processing(&self) -> bool {
        self.inner.processing.load(Ordering::Acquire)
    }

    pub fn is_dragging(&self) -> bool {
        self.inner.dragging.load(Ordering::Acquire)
    }

    // ── Drag state ───────────────────────────────────────────────────────────────────

    pub async fn set_dragging(&self, dragging: bool) {
        let observers = self.inner.observers.lock().await;
        if self.inner.dragging.swap(dragging, Ordering::AcqRel) != dragging {
            deliver(&observers, &StateEvent::DraggingChanged(dragging));
        }
    }

    // ── Pending list ─────────────────────────────────────────────────────────────────

    /// Appends a batch after validating it as a whole.
    ///
    /// Returns the new pending count. On rejection nothing is added.
    pub async fn add_files(&self, batch: Vec<ImageFile>) -> CompressorResult<usize> {
        validate_batch(&batch, self.inner.max_file_bytes)?;

        let added = batch.len();
        let mut lists = self.inner.lists.lock().await;
        lists.pending.extend(batch);
        let count = lists.pending.len();
        let event = StateEvent::PendingChanged(lists.pending.summaries());
        self.publish(lists, event).await;

        debug!("Added {} file(s), {} pending", added, count);
        Ok(count)
    }

    pub async fn remove_pending(&self, index: usize) -> CompressorResult<ImageFile> {
        let mut lists = self.inner.lists.lock().await;
        let removed = lists.pending.remove(index)?;
        let event = StateEvent::PendingChanged(lists.pending.summaries());
        self.publish(lists, event).await;

        debug!("Removed pending '{}' at {}", removed.name(), index);
        Ok(removed)
    }

    pub async fn clear_pending(&self) {
        let mut lists = self.inner.lists.lock().await;
        lists.pending.clear();
        self.publish(lists, StateEvent::PendingChanged(Vec::new())).await;
    }

    // ── Compressed list ──────────────────────────────────────────────────────────────

    pub async fn remove_compressed(&self, index: usize) -> CompressorResult<ImageFile> {
        let mut lists = self.inner.lists.lock().await;
        let removed = lists.compressed.remove(index)?;
        let event = StateEvent::CompressedChanged(lists.compressed.summaries());
        self.publish(lists, event).await;

        debug!("Removed compressed '{}' at {}", removed.name(), index);
        Ok(removed)
    }

    pub async fn clear_compressed(&self) {
        let mut lists = self.inner.lists.lock().await;
        lists.compressed.clear();
        self.publish(lists, StateEvent::CompressedChanged(Vec::new())).await;
    }

    // ── Settings ─────────────────────────────────────────────────────────────────────

    /// Quality slider, 1-100.
    pub async fn set_quality(&self, percent: u32) -> CompressorResult<()> {
        let quality = quality_from_percent(percent)?;
        self.update_settings(|settings| settings.initial_quality = quality).await;
        Ok(())
    }

    /// Size slider, in MiB.
    pub async fn set_max_size_mb(&self, max_size_mb: f64) -> CompressorResult<()> {
        validate_max_size_mb(max_size_mb)?;
        self.update_settings(|settings| settings.max_size_mb = max_size_mb).await;
        Ok(())
    }

    pub async fn set_off_thread(&self, off_thread: bool) {
        self.update_settings(|settings| settings.off_thread = off_thread).await;
    }

    async fn update_settings(&self, apply: impl FnOnce(&mut CompressionSettings)) {
        let mut lists = self.inner.lists.lock().await;
        apply(&mut lists.settings);
        let settings = lists.settings.clone();
        debug!("Settings changed: {:?}", settings);
        self.publish(lists, StateEvent::SettingsChanged(settings)).await;
    }

    // ── Compression ──────────────────────────────────────────────────────────────────

    /// Compresses every pending file and replaces the compressed list with the results.
    ///
    /// All files are compressed concurrently; results keep the pending order.
    /// A call made while a run is in flight returns
    /// [`CompressOutcome::AlreadyRunning`] and changes nothing. A failure leaves
    /// the compressed list untouched.
    ///
    /// The run itself is a spawned task: dropping the returned future does not
    /// cancel it, and observers still see it finish.
    pub async fn compress(&self) -> CompressOutcome {
        if self
            .inner
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Compression already running, request ignored");
            return CompressOutcome::AlreadyRunning;
        }

        let state = self.clone();
        let run = tokio::spawn(async move {
            let guard = ProcessingGuard(&state.inner.processing);
            state.notify(StateEvent::ProcessingChanged(true)).await;
            let outcome = state.run_compression().await;

            // Cleared under the observer lock so a follow-up run's `true` lands after this `false`
            let observers = state.inner.observers.lock().await;
            drop(guard);
            deliver(&observers, &StateEvent::ProcessingChanged(false));
            outcome
        });

        match run.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Compression task aborted: {}", e);
                CompressOutcome::Failed(CompressorError::from(e))
            }
        }
    }

    async fn run_compression(&self) -> CompressOutcome {
        let (snapshot, settings) = {
            let lists = self.inner.lists.lock().await;
            (lists.pending.snapshot(), lists.settings.clone())
        };

        let total = snapshot.len();
        info!("Compressing {} file(s)", total);
        self.notify(StateEvent::Progress(Progress::start(total))).await;

        let start = Instant::now();
        let completed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = snapshot
            .iter()
            .cloned()
            .map(|file| {
                let state = self.clone();
                let compressor = Arc::clone(&self.inner.compressor);
                let settings = settings.clone();
                let completed = Arc::clone(&completed);

                tokio::spawn(async move {
                    let compressed = compressor.compress(&file, &settings).await.map_err(|e| {
                        warn!("Compression failed for {}: {}", file.name(), e);
                        e
                    })?;

                    let done = completed.fetch_add(1, Ordering::AcqRel) + 1;
                    let progress = Progress::file_done(done, total, file.name(), file.size(), compressed.size());
                    debug!("{}", progress.status);
                    state.notify(StateEvent::Progress(progress)).await;

                    Ok::<_, CompressorError>(compressed)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        let mut handles = handles.into_iter();
        while let Some(handle) = handles.next() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(CompressorError::from(e)),
            };

            match result {
                Ok(file) => results.push(file),
                Err(e) => {
                    for remaining in handles.by_ref() {
                        remaining.abort();
                    }

                    let failed_name = snapshot.get(results.len()).map(ImageFile::name);
                    error!("Compression run failed: {}", e);
                    let done = completed.load(Ordering::Acquire);
                    let progress = Progress::error(done, total, failed_name, &e.to_string());
                    self.notify(StateEvent::Progress(progress)).await;
                    return CompressOutcome::Failed(e);
                }
            }
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        let summary = CompressionSummary::from_files(&snapshot, &results, elapsed_ms);

        let mut lists = self.inner.lists.lock().await;
        lists.compressed.replace(results);
        let event = StateEvent::CompressedChanged(lists.compressed.summaries());
        self.publish(lists, event).await;

        info!(
            "Compressed {} file(s) in {}ms ({} bytes saved, {:.1}%)",
            summary.image_count, summary.total_time_ms, summary.saved_bytes, summary.compression_ratio
        );
        self.notify(StateEvent::Progress(Progress::complete(summary.clone()))).await;

        CompressOutcome::Completed(summary)
    }

    // ── Downloads ────────────────────────────────────────────────────────────────────

    /// Saves compressed entry `index` under its own name.
    pub async fn download_file(&self, index: usize, sink: &dyn SaveSink) -> CompressorResult<PathBuf> {
        let file = {
            let lists = self.inner.lists.lock().await;
            lists.compressed.get(index).cloned().ok_or(CompressorError::IndexOutOfRange {
                index,
                len: lists.compressed.len(),
            })?
        };

        let path = sink.save(file.name(), file.bytes()).await?;
        info!("Saved '{}' to {}", file.name(), path.display());
        Ok(path)
    }

    /// Bundles the compressed list into one zip and saves it under the archive name.
    pub async fn download_all(&self, sink: &dyn SaveSink) -> CompressorResult<PathBuf> {
        let files = self.compressed().await;
        let count = files.len();

        let archive = build_archive_async(files).await?;
        let path = sink.save(&self.inner.archive_name, &archive).await?;

        info!("Saved {} file(s) as {} ({} bytes)", count, path.display(), archive.len());
        Ok(path)
    }
}

fn deliver(observers: &[(ObserverId, Arc<dyn StateObserver>)], event: &StateEvent) {
    for (_, observer) in observers {
        observer.on_event(event);
    }
}
