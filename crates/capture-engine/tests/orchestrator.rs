use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::DateTime;
use deskreel_capture_engine::{
    CaptureBackend, CaptureOrchestrator, CaptureState, CycleOutcome, FocusProbe, ImageOutcome,
    LockProbe, LogOutcome, MonitorCapture, OrchestratorConfig, RetryPolicy,
};
use deskreel_capture_model::{partition_date, MonitorFrame, WindowRecord, WindowSnapshot};
use deskreel_common::clock::{FixedClock, Timestamp};
use deskreel_common::error::{DeskreelError, DeskreelResult};
use deskreel_storage::{inspect_day, read_day_log};
use image::{DynamicImage, Rgb, RgbImage};
use tokio_util::sync::CancellationToken;

/// Two monitors of different heights filled with `shade`, or a failure.
struct ScriptedScreens {
    script: Mutex<VecDeque<Option<u8>>>,
    last: Mutex<u8>,
}

impl ScriptedScreens {
    fn new(script: impl IntoIterator<Item = Option<u8>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(0),
        }
    }
}

impl MonitorCapture for ScriptedScreens {
    fn capture_monitors(&self) -> DeskreelResult<Vec<MonitorFrame>> {
        let next = self.script.lock().unwrap().pop_front();
        let shade = match next {
            Some(Some(shade)) => shade,
            Some(None) => return Err(DeskreelError::acquisition("monitor DP-2 went away")),
            None => *self.last.lock().unwrap(),
        };
        *self.last.lock().unwrap() = shade;
        let monitor = |name: &str, w, h| {
            MonitorFrame::new(
                name,
                DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([shade, shade, shade]))),
            )
        };
        Ok(vec![monitor("HDMI-1", 16, 9), monitor("DP-1", 32, 18)])
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Lock answers in order; `None` is a failed query. Unlocked once exhausted.
struct ScriptedLock {
    script: Mutex<VecDeque<Option<bool>>>,
    delay: Duration,
}

impl ScriptedLock {
    fn new(script: impl IntoIterator<Item = Option<bool>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            delay: Duration::ZERO,
        }
    }

    fn unlocked() -> Self {
        Self::new(std::iter::empty())
    }
}

impl LockProbe for ScriptedLock {
    fn is_locked(&self) -> DeskreelResult<bool> {
        std::thread::sleep(self.delay);
        match self.script.lock().unwrap().pop_front() {
            Some(Some(locked)) => Ok(locked),
            Some(None) => Err(DeskreelError::platform("loginctl is not installed")),
            None => Ok(false),
        }
    }
}

struct StaticFocus {
    fail: bool,
}

impl FocusProbe for StaticFocus {
    fn snapshot(&self, at: Timestamp) -> DeskreelResult<WindowSnapshot> {
        if self.fail {
            return Err(DeskreelError::acquisition("wmctrl is not installed"));
        }
        Ok(WindowSnapshot {
            timestamp: at,
            focused_app_name: "zsh".to_string(),
            focused_app_pid: 4242,
            focused_window_name: "cargo test".to_string(),
            windows: vec![WindowRecord {
                app_name: "zsh".to_string(),
                window_name: "cargo test".to_string(),
                owner_pid: 4242,
                is_active: true,
                is_focused_window: true,
            }],
            error: None,
        })
    }
}

struct Harness {
    root: tempfile::TempDir,
    clock: Arc<FixedClock>,
    orchestrator: CaptureOrchestrator,
}

impl Harness {
    fn build(
        screens: ScriptedScreens,
        lock: ScriptedLock,
        focus: StaticFocus,
        tweak: impl FnOnce(&mut OrchestratorConfig),
    ) -> Self {
        let root = tempfile::tempdir().unwrap();
        let mut config = OrchestratorConfig {
            storage_root: root.path().to_path_buf(),
            interval: Duration::from_secs(30),
            change_threshold: 10,
            save_all_captures: false,
            lock_probe_timeout: Duration::from_secs(5),
            retry: RetryPolicy::new(3, Duration::from_millis(1)),
        };
        tweak(&mut config);
        let clock = Arc::new(FixedClock::new(start()));
        let orchestrator = CaptureOrchestrator::with_clock(
            config,
            CaptureBackend::new(screens, lock, focus),
            clock.clone(),
        );
        Self {
            root,
            clock,
            orchestrator,
        }
    }

    fn simple(screens: ScriptedScreens) -> Self {
        Self::build(screens, ScriptedLock::unlocked(), StaticFocus { fail: false }, |_| {})
    }

    async fn tick(&mut self) -> CycleOutcome {
        let outcome = self.orchestrator.tick().await;
        self.clock.advance(chrono::Duration::seconds(30));
        outcome
    }

    fn day_dir(&self) -> std::path::PathBuf {
        self.root.path().join("2026/10/17")
    }

    fn screenshots(&self) -> Vec<String> {
        inspect_day(self.root.path(), partition_date(&start())).screenshots
    }

    fn records(&self) -> Vec<WindowSnapshot> {
        read_day_log(&self.day_dir().join("window_data.jsonl"))
            .unwrap()
            .records
    }
}

fn start() -> Timestamp {
    DateTime::parse_from_rfc3339("2026-10-17T09:00:00.000Z").unwrap()
}

fn image_of(outcome: &CycleOutcome) -> &ImageOutcome {
    match outcome {
        CycleOutcome::Completed { image, .. } => image,
        CycleOutcome::Paused => panic!("expected a completed cycle"),
    }
}

fn log_of(outcome: &CycleOutcome) -> &LogOutcome {
    match outcome {
        CycleOutcome::Completed { log, .. } => log,
        CycleOutcome::Paused => panic!("expected a completed cycle"),
    }
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn identical_frames_store_once_but_log_every_cycle() {
    let mut h = Harness::simple(ScriptedScreens::new([Some(100), Some(100), Some(100)]));

    let first = h.tick().await;
    assert!(matches!(image_of(&first), ImageOutcome::Stored(_)));
    assert_eq!(*image_of(&h.tick().await), ImageOutcome::Unchanged);
    assert_eq!(*image_of(&h.tick().await), ImageOutcome::Unchanged);

    assert_eq!(h.screenshots(), ["20261017_090000.png"]);
    assert_eq!(h.records().len(), 3);

    let status = h.orchestrator.status();
    assert_eq!(status.cycles_run, 3);
    assert_eq!(status.frames_stored, 1);
    assert_eq!(status.frames_unchanged, 2);
    assert_eq!(status.log_records_written, 3);
    assert_eq!(status.consecutive_failures, 0);
}

#[tokio::test]
async fn small_differences_stay_below_threshold() {
    let mut h = Harness::simple(ScriptedScreens::new([Some(100), Some(110), Some(121)]));

    h.tick().await;
    assert_eq!(*image_of(&h.tick().await), ImageOutcome::Unchanged);
    // Compared against the retained 100, not the skipped 110.
    assert!(matches!(image_of(&h.tick().await), ImageOutcome::Stored(_)));
    assert_eq!(h.screenshots().len(), 2);
}

#[tokio::test]
async fn locked_session_skips_all_work_until_unlocked() {
    let lock = ScriptedLock::new([Some(false), Some(true), Some(true), Some(false)]);
    let mut h = Harness::build(
        ScriptedScreens::new([Some(10), Some(200)]),
        lock,
        StaticFocus { fail: false },
        |_| {},
    );

    assert!(matches!(h.tick().await, CycleOutcome::Completed { .. }));
    assert_eq!(h.tick().await, CycleOutcome::Paused);
    assert_eq!(h.orchestrator.state(), CaptureState::Paused);
    assert_eq!(h.orchestrator.status().state, CaptureState::Paused);
    assert_eq!(h.tick().await, CycleOutcome::Paused);

    let resumed = h.tick().await;
    assert!(matches!(image_of(&resumed), ImageOutcome::Stored(_)));
    assert_eq!(h.orchestrator.state(), CaptureState::Running);

    assert_eq!(h.records().len(), 2);
    assert_eq!(h.screenshots(), ["20261017_090000.png", "20261017_090130.png"]);
}

#[tokio::test]
async fn capture_now_is_ignored_while_paused() {
    let mut h = Harness::build(
        ScriptedScreens::new([Some(1)]),
        ScriptedLock::new([Some(true)]),
        StaticFocus { fail: false },
        |_| {},
    );
    assert_eq!(h.tick().await, CycleOutcome::Paused);
    assert_eq!(h.orchestrator.capture_now().await, CycleOutcome::Paused);
    assert_eq!(file_count(&h.day_dir()), 0);
}

#[tokio::test]
async fn failed_lock_query_keeps_current_state() {
    let lock = ScriptedLock::new([None, Some(true), None]);
    let mut h = Harness::build(
        ScriptedScreens::new([Some(1)]),
        lock,
        StaticFocus { fail: false },
        |_| {},
    );

    assert!(matches!(h.tick().await, CycleOutcome::Completed { .. }));
    assert_eq!(h.tick().await, CycleOutcome::Paused);
    assert_eq!(h.tick().await, CycleOutcome::Paused);
}

#[tokio::test]
async fn slow_lock_query_times_out_and_cycle_runs() {
    let mut lock = ScriptedLock::new([Some(true)]);
    lock.delay = Duration::from_millis(300);
    let mut h = Harness::build(
        ScriptedScreens::new([Some(1)]),
        lock,
        StaticFocus { fail: false },
        |c| c.lock_probe_timeout = Duration::from_millis(20),
    );

    assert!(matches!(h.tick().await, CycleOutcome::Completed { .. }));
    assert_eq!(h.orchestrator.state(), CaptureState::Running);
}

#[tokio::test]
async fn monitor_failure_keeps_retained_frame_and_still_logs() {
    let mut h = Harness::simple(ScriptedScreens::new([Some(50), None, Some(50)]));

    h.tick().await;
    let failed = h.tick().await;
    assert!(matches!(image_of(&failed), ImageOutcome::Failed(msg) if msg.contains("DP-2")));
    assert!(matches!(log_of(&failed), LogOutcome::Appended { error_flagged: false }));
    assert_eq!(h.orchestrator.status().consecutive_failures, 1);

    // Same image as the retained one: the failed cycle did not reset it.
    assert_eq!(*image_of(&h.tick().await), ImageOutcome::Unchanged);
    assert_eq!(h.orchestrator.status().consecutive_failures, 0);
    assert_eq!(h.records().len(), 3);
}

#[tokio::test]
async fn focus_failure_logs_error_flagged_record_and_image_path_proceeds() {
    let mut h = Harness::build(
        ScriptedScreens::new([Some(7)]),
        ScriptedLock::unlocked(),
        StaticFocus { fail: true },
        |_| {},
    );

    let outcome = h.tick().await;
    assert!(matches!(image_of(&outcome), ImageOutcome::Stored(_)));
    assert_eq!(*log_of(&outcome), LogOutcome::Appended { error_flagged: true });

    let records = h.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].windows.is_empty());
    assert_eq!(records[0].focused_app_name, "Unknown");
    assert!(records[0].error.as_deref().unwrap().contains("wmctrl"));
}

#[tokio::test]
async fn same_second_collision_is_not_retained_and_record_is_kept() {
    let mut h = Harness::simple(ScriptedScreens::new([Some(0), Some(255), Some(255)]));

    let first = h.orchestrator.tick().await;
    let first_path = first.stored_path().unwrap().clone();
    let original = std::fs::read(&first_path).unwrap();

    // Same instant, different image.
    h.clock.advance(chrono::Duration::milliseconds(400));
    let collided = h.orchestrator.tick().await;
    assert!(matches!(image_of(&collided), ImageOutcome::Failed(msg) if msg.contains("overwrite")));
    assert!(matches!(log_of(&collided), LogOutcome::Appended { .. }));
    assert_eq!(std::fs::read(&first_path).unwrap(), original);

    // The collided frame never became the reference, so it is still "changed".
    h.clock.advance(chrono::Duration::seconds(30));
    assert!(matches!(image_of(&h.orchestrator.tick().await), ImageOutcome::Stored(_)));
    assert_eq!(h.records().len(), 3);
}

#[tokio::test]
async fn repeated_local_hour_stores_both_frames() {
    let mut h = Harness::simple(ScriptedScreens::new([Some(0), Some(255)]));

    h.clock.set(DateTime::parse_from_rfc3339("2026-11-01T01:30:00-04:00").unwrap());
    let before = h.orchestrator.tick().await;
    h.clock.set(DateTime::parse_from_rfc3339("2026-11-01T01:30:00-05:00").unwrap());
    let after = h.orchestrator.tick().await;

    assert!(matches!(image_of(&before), ImageOutcome::Stored(_)));
    assert!(matches!(image_of(&after), ImageOutcome::Stored(_)));
    assert_ne!(before.stored_path(), after.stored_path());
    assert_eq!(h.orchestrator.status().consecutive_failures, 0);
}

#[tokio::test]
async fn save_all_bypasses_change_detection() {
    let mut h = Harness::build(
        ScriptedScreens::new([Some(3), Some(3), Some(3)]),
        ScriptedLock::unlocked(),
        StaticFocus { fail: false },
        |c| c.save_all_captures = true,
    );
    for _ in 0..3 {
        assert!(matches!(image_of(&h.tick().await), ImageOutcome::Stored(_)));
    }
    assert_eq!(h.screenshots().len(), 3);
}

#[tokio::test]
async fn clearing_the_retained_frame_forces_a_store() {
    let mut h = Harness::simple(ScriptedScreens::new([Some(9), Some(9)]));
    h.tick().await;
    h.orchestrator.clear_retained_frame();
    assert!(matches!(image_of(&h.tick().await), ImageOutcome::Stored(_)));
}

#[tokio::test]
async fn exhausted_storage_retries_surface_in_status_only() {
    let mut h = Harness::build(
        ScriptedScreens::new([Some(1), Some(2)]),
        ScriptedLock::unlocked(),
        StaticFocus { fail: false },
        |c| {
            c.storage_root = c.storage_root.join("blocked");
            c.retry = RetryPolicy::new(2, Duration::from_millis(1));
        },
    );
    // A regular file where the storage root should be.
    std::fs::write(h.root.path().join("blocked"), b"not a directory").unwrap();

    let first = h.tick().await;
    assert!(first.is_failure());
    assert!(matches!(log_of(&first), LogOutcome::Failed(_)));
    let second = h.tick().await;
    assert!(second.is_failure());

    let status = h.orchestrator.status();
    assert_eq!(status.cycles_run, 2);
    assert_eq!(status.frames_stored, 0);
    assert_eq!(status.consecutive_failures, 2);
    assert!(status.last_error.is_some());
}

#[tokio::test]
async fn subscribers_see_every_cycle() {
    let mut h = Harness::simple(ScriptedScreens::new([Some(1)]));
    let mut rx = h.orchestrator.subscribe();
    h.tick().await;
    assert!(rx.has_changed().unwrap());
    let status = rx.borrow_and_update().clone();
    assert_eq!(status.cycles_run, 1);
    assert!(status.last_stored_path.unwrap().ends_with("20261017_090000.png"));
}

#[tokio::test]
async fn run_stops_on_cancel_after_finishing_its_cycle() {
    let h = Harness::build(
        ScriptedScreens::new(std::iter::empty()),
        ScriptedLock::unlocked(),
        StaticFocus { fail: false },
        |c| c.interval = Duration::from_millis(10),
    );
    let Harness {
        root,
        mut orchestrator,
        ..
    } = h;
    let cancel = CancellationToken::new();

    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            orchestrator.run(cancel).await;
            orchestrator
        }
    });
    tokio::time::sleep(Duration::from_millis(60)).await;
    cancel.cancel();

    let orchestrator = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("loop should stop after cancel")
        .unwrap();
    let status = orchestrator.status();
    assert!(status.cycles_run >= 1);
    assert_eq!(status.log_records_written, status.cycles_run);
    drop(root);
}
