use chrono::{DateTime, Duration, FixedOffset};
use deskreel_capture_model::{partition_date, NormalizedFrame, WindowSnapshot};
use deskreel_storage::{inspect_day, read_day_log, EventLogWriter, FrameStore};
use image::{Rgb, RgbImage};

fn start() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-10-17T08:00:00.000Z").unwrap()
}

fn frame(shade: u8) -> NormalizedFrame {
    NormalizedFrame::from_rgb(RgbImage::from_pixel(16, 9, Rgb([shade, shade, shade])))
}

#[test]
fn a_day_of_cycles_is_readable_back() {
    let root = tempfile::tempdir().unwrap();
    let store = FrameStore::new(root.path());
    let log = EventLogWriter::new(root.path());

    for cycle in 0..20i64 {
        let at = start() + Duration::seconds(30 * cycle);
        if cycle % 4 == 0 {
            store.store(&frame(cycle as u8), &at).unwrap();
        }
        log.append(&WindowSnapshot::unavailable(at, "headless"), partition_date(&at))
            .unwrap();
    }

    let inventory = inspect_day(root.path(), partition_date(&start()));
    assert!(inventory.is_valid(), "errors: {:?}", inventory.errors);
    assert!(inventory.warnings.is_empty(), "warnings: {:?}", inventory.warnings);
    assert_eq!(inventory.screenshots.len(), 5);
    assert_eq!(inventory.screenshots[0], "20261017_080000.png");

    let readout = read_day_log(&inventory.event_log.unwrap()).unwrap();
    assert_eq!(readout.records.len(), 20);
    assert!(readout.corrupt.is_empty());
    assert_eq!(readout.records[19].timestamp, start() + Duration::seconds(570));
}

#[test]
fn a_crash_mid_record_only_loses_that_record() {
    let root = tempfile::tempdir().unwrap();
    let log = EventLogWriter::new(root.path());
    let day = partition_date(&start());

    let mut path = None;
    for cycle in 0..10i64 {
        let at = start() + Duration::seconds(cycle);
        path = Some(log.append(&WindowSnapshot::unavailable(at, "x"), day).unwrap());
    }
    let path = path.unwrap();

    // Simulate a process killed halfway through the eleventh record.
    let full = WindowSnapshot::unavailable(start() + Duration::seconds(10), "x")
        .to_record_line()
        .unwrap();
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.extend_from_slice(&full.as_bytes()[..full.len() / 2]);
    std::fs::write(&path, bytes).unwrap();

    let readout = read_day_log(&path).unwrap();
    assert_eq!(readout.records.len(), 10);
    assert_eq!(readout.corrupt.len(), 1);
    assert_eq!(readout.corrupt[0].line, 11);

    // The next process keeps appending cleanly after the torn line.
    log.append(
        &WindowSnapshot::unavailable(start() + Duration::seconds(11), "x"),
        day,
    )
    .unwrap();
    let readout = read_day_log(&path).unwrap();
    assert_eq!(readout.records.len(), 11);
    assert_eq!(readout.corrupt.len(), 1);
}

#[test]
fn frames_and_records_share_the_utc_partition() {
    let root = tempfile::tempdir().unwrap();
    let store = FrameStore::new(root.path());
    let log = EventLogWriter::new(root.path());

    // Evening of the 17th in New York is already the 18th in UTC.
    let at = DateTime::parse_from_rfc3339("2026-10-17T22:30:00-04:00").unwrap();
    let png = store.store(&frame(1), &at).unwrap();
    let jsonl = log
        .append(&WindowSnapshot::unavailable(at, "x"), partition_date(&at))
        .unwrap();

    assert_eq!(png.parent(), jsonl.parent());
    assert!(png.ends_with("2026/10/18/20261018_023000.png"));
    let inventory = inspect_day(root.path(), partition_date(&at));
    assert!(inventory.is_valid());
    assert!(inventory.warnings.is_empty(), "warnings: {:?}", inventory.warnings);
}
