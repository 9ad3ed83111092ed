//! The capture loop.
//!
//! Each tick first re-checks the session lock. While unlocked, a cycle
//! stamps one timestamp and then runs two independent paths side by side:
//!
//! - image: grab monitors, normalize, compare with the retained frame,
//!   store if changed
//! - log: snapshot focus and windows, append to the day's log
//!
//! A failure on one path never stops the other. The retained frame and the
//! running/paused flag belong to the orchestrator alone and change only
//! between cycles.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use deskreel_capture_model::{partition_date, NormalizedFrame, WindowSnapshot};
use deskreel_common::clock::{CaptureClock, SystemClock, Timestamp};
use deskreel_common::config::AppConfig;
use deskreel_common::error::{DeskreelError, DeskreelResult};
use deskreel_processing_core::change::{difference_ratio, max_channel_difference};
use deskreel_processing_core::{ChangeDetector, ImageNormalizer};
use deskreel_storage::{EventLogWriter, FrameStore};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::backend::{CaptureBackend, FocusProbe, MonitorCapture};
use crate::retry::RetryPolicy;
use crate::status::{CaptureState, CaptureStatus, CycleOutcome, ImageOutcome, LogOutcome};

/// Resolved settings for one orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub storage_root: PathBuf,
    pub interval: Duration,
    pub change_threshold: u8,
    pub save_all_captures: bool,
    pub lock_probe_timeout: Duration,
    pub retry: RetryPolicy,
}

impl OrchestratorConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            storage_root: config.storage_root.clone(),
            interval: config.capture.interval(),
            change_threshold: config.capture.change_threshold,
            save_all_captures: config.capture.save_all_captures,
            lock_probe_timeout: config.capture.lock_probe_timeout(),
            retry: RetryPolicy::from_settings(&config.storage),
        }
    }
}

/// Drives capture cycles against a [`CaptureBackend`].
pub struct CaptureOrchestrator {
    config: OrchestratorConfig,
    backend: CaptureBackend,
    clock: Arc<dyn CaptureClock>,
    normalizer: ImageNormalizer,
    detector: ChangeDetector,
    frames: FrameStore,
    log: EventLogWriter,
    state: CaptureState,
    retained: Option<Arc<NormalizedFrame>>,
    status_tx: watch::Sender<CaptureStatus>,
}

/// Distance from the retained frame, for logs. `None` without one.
struct Diff {
    max_channel: Option<u8>,
    /// Channel values over the threshold, in percent.
    changed_pct: Option<f64>,
}

/// Image path result before the retained frame is updated.
enum ImagePath {
    Stored(PathBuf, Arc<NormalizedFrame>),
    Unchanged,
    Failed(DeskreelError),
}

impl CaptureOrchestrator {
    /// Create an orchestrator stamping cycles with local wall-clock time.
    pub fn new(config: OrchestratorConfig, backend: CaptureBackend) -> Self {
        Self::with_clock(config, backend, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: OrchestratorConfig,
        backend: CaptureBackend,
        clock: Arc<dyn CaptureClock>,
    ) -> Self {
        let (status_tx, _) = watch::channel(CaptureStatus::default());
        Self {
            normalizer: ImageNormalizer::default(),
            detector: ChangeDetector::new(config.change_threshold),
            frames: FrameStore::new(config.storage_root.clone()),
            log: EventLogWriter::new(config.storage_root.clone()),
            config,
            backend,
            clock,
            state: CaptureState::Running,
            retained: None,
            status_tx,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Latest published status.
    pub fn status(&self) -> CaptureStatus {
        self.status_tx.borrow().clone()
    }

    /// Receive a status update after every tick.
    pub fn subscribe(&self) -> watch::Receiver<CaptureStatus> {
        self.status_tx.subscribe()
    }

    /// Forget the retained frame so the next cycle always stores.
    pub fn clear_retained_frame(&mut self) {
        if self.retained.take().is_some() {
            tracing::debug!("Retained frame cleared");
        }
    }

    /// Run scheduled ticks until `cancel` fires.
    ///
    /// Cancellation is only observed between ticks: a cycle in progress
    /// always finishes its writes first.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(
            root = %self.config.storage_root.display(),
            interval_secs = self.config.interval.as_secs_f64(),
            threshold = self.config.change_threshold,
            save_all = self.config.save_all_captures,
            capture = self.backend.monitors.name(),
            "Capture loop started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        let status = self.status();
        tracing::info!(
            cycles = status.cycles_run,
            frames_stored = status.frames_stored,
            records = status.log_records_written,
            "Capture loop stopped"
        );
    }

    /// One scheduled tick: re-check the lock, then cycle unless paused.
    pub async fn tick(&mut self) -> CycleOutcome {
        if let Some(locked) = self.probe_lock().await {
            match (self.state, locked) {
                (CaptureState::Running, true) => {
                    tracing::info!("Session locked, pausing capture");
                    self.state = CaptureState::Paused;
                }
                (CaptureState::Paused, false) => {
                    tracing::info!("Session unlocked, resuming capture");
                    self.state = CaptureState::Running;
                }
                _ => {}
            }
            let state = self.state;
            self.status_tx.send_modify(|s| s.state = state);
        }

        if self.state == CaptureState::Paused {
            return CycleOutcome::Paused;
        }
        self.run_cycle().await
    }

    /// Force a cycle now, without waiting for the schedule. Does nothing
    /// while paused.
    pub async fn capture_now(&mut self) -> CycleOutcome {
        if self.state == CaptureState::Paused {
            tracing::debug!("Forced capture ignored while paused");
            return CycleOutcome::Paused;
        }
        self.run_cycle().await
    }

    /// `None` when the probe failed or timed out; the caller keeps its
    /// current state then.
    async fn probe_lock(&self) -> Option<bool> {
        let lock = Arc::clone(&self.backend.lock);
        let probe = tokio::task::spawn_blocking(move || lock.is_locked());

        match tokio::time::timeout(self.config.lock_probe_timeout, probe).await {
            Ok(Ok(Ok(locked))) => Some(locked),
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "Lock state query failed, keeping current state");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Lock state worker failed, keeping current state");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.lock_probe_timeout.as_millis() as u64,
                    "Lock state query timed out, keeping current state"
                );
                None
            }
        }
    }

    async fn run_cycle(&mut self) -> CycleOutcome {
        let at = self.clock.now();

        let image = image_path(
            Arc::clone(&self.backend.monitors),
            self.normalizer,
            self.detector,
            self.config.save_all_captures,
            self.retained.clone(),
            self.frames.clone(),
            self.config.retry,
            at,
        );
        let log = log_path(
            Arc::clone(&self.backend.focus),
            self.log.clone(),
            self.config.retry,
            at,
        );
        let (image, log) = tokio::join!(image, log);

        let image = match image {
            ImagePath::Stored(path, frame) => {
                self.retained = Some(frame);
                ImageOutcome::Stored(path)
            }
            ImagePath::Unchanged => ImageOutcome::Unchanged,
            ImagePath::Failed(e) => ImageOutcome::Failed(e.to_string()),
        };

        let outcome = CycleOutcome::Completed { at, image, log };
        self.record(&outcome);
        outcome
    }

    fn record(&self, outcome: &CycleOutcome) {
        let CycleOutcome::Completed { at, image, log } = outcome else {
            return;
        };
        let failed = outcome.is_failure();
        self.status_tx.send_modify(|s| {
            s.cycles_run += 1;
            s.last_cycle_at = Some(*at);
            match image {
                ImageOutcome::Stored(path) => {
                    s.frames_stored += 1;
                    s.last_stored_path = Some(path.clone());
                }
                ImageOutcome::Unchanged => s.frames_unchanged += 1,
                ImageOutcome::Failed(e) => s.last_error = Some(e.clone()),
            }
            match log {
                LogOutcome::Appended { .. } => s.log_records_written += 1,
                LogOutcome::Failed(e) => s.last_error = Some(e.clone()),
            }
            if failed {
                s.consecutive_failures += 1;
            } else {
                s.consecutive_failures = 0;
            }
        });
    }
}

#[allow(clippy::too_many_arguments)]
async fn image_path(
    capture: Arc<dyn MonitorCapture>,
    normalizer: ImageNormalizer,
    detector: ChangeDetector,
    save_all: bool,
    retained: Option<Arc<NormalizedFrame>>,
    frames: FrameStore,
    retry: RetryPolicy,
    at: Timestamp,
) -> ImagePath {
    let prepared = tokio::task::spawn_blocking(move || -> DeskreelResult<_> {
        let grabbed = capture.capture_monitors()?;
        let normalized = normalizer.normalize(&grabbed)?;
        let changed = save_all || detector.has_changed(retained.as_deref(), &normalized);
        let prev = retained.as_deref();
        let diff = Diff {
            max_channel: prev.and_then(|p| max_channel_difference(p, &normalized)),
            changed_pct: prev.and_then(|p| difference_ratio(p, &normalized, detector.threshold())),
        };
        Ok((normalized, changed, diff))
    })
    .await
    .map_err(|e| DeskreelError::Other(e.into()))
    .and_then(|r| r);

    let (normalized, changed, diff) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::warn!(error = %e, "Frame acquisition failed, keeping retained frame");
            return ImagePath::Failed(e);
        }
    };

    if !changed {
        tracing::debug!(
            max_diff = ?diff.max_channel,
            changed_pct = ?diff.changed_pct,
            threshold = detector.threshold(),
            "Frame unchanged"
        );
        return ImagePath::Unchanged;
    }

    let frame = Arc::new(normalized);
    let to_store = Arc::clone(&frame);
    match retry
        .run_blocking("store frame", move || frames.store(&to_store, &at))
        .await
    {
        Ok(path) => {
            tracing::info!(
                path = %path.display(),
                max_diff = ?diff.max_channel,
                changed_pct = ?diff.changed_pct,
                "Frame stored"
            );
            ImagePath::Stored(path, frame)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Frame not stored");
            ImagePath::Failed(e)
        }
    }
}

async fn log_path(
    focus: Arc<dyn FocusProbe>,
    log: EventLogWriter,
    retry: RetryPolicy,
    at: Timestamp,
) -> LogOutcome {
    let snapshot = tokio::task::spawn_blocking(move || focus.snapshot(at))
        .await
        .map_err(|e| DeskreelError::Other(e.into()))
        .and_then(|r| r)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Window snapshot failed, logging placeholder record");
            WindowSnapshot::unavailable(at, e.to_string())
        });

    let error_flagged = snapshot.is_error_flagged();
    let snapshot = Arc::new(snapshot);
    match retry
        .run_blocking("append window record", move || {
            log.append(&snapshot, partition_date(&at))
        })
        .await
    {
        Ok(path) => {
            tracing::trace!(path = %path.display(), error_flagged, "Window record appended");
            LogOutcome::Appended { error_flagged }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Window record not written");
            LogOutcome::Failed(e.to_string())
        }
    }
}
