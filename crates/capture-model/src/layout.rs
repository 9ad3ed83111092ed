//! The on-disk layout contract.
//!
//! ```text
//! <root>/YYYY/MM/DD/YYYYMMDD_HHMMSS.png     one file per retained frame
//! <root>/YYYY/MM/DD/window_data.jsonl       one append-only log per day
//! ```
//!
//! Every numeric component is zero-padded to a fixed width. Paths are a
//! pure function of the capture instant, read in UTC: local wall-clock
//! time repeats an hour when daylight saving ends, UTC never does. The
//! file name keeps whole seconds, so two captures in the same second
//! derive the same path.

use std::path::{Component, Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use deskreel_common::clock::Timestamp;

/// Extension of retained frames (lossless).
pub const SCREENSHOT_EXTENSION: &str = "png";

/// Name of the per-day event log.
pub const EVENT_LOG_FILE_NAME: &str = "window_data.jsonl";

/// Resolves date partitions and file names beneath a storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLayout {
    root: PathBuf,
}

impl DateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/YYYY/MM/DD` for the given calendar day.
    pub fn partition_dir(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
            .join(format!("{:02}", date.day()))
    }

    /// `<root>/YYYY/MM/DD/window_data.jsonl`.
    pub fn event_log_path(&self, date: NaiveDate) -> PathBuf {
        self.partition_dir(date).join(EVENT_LOG_FILE_NAME)
    }

    /// Full path of the frame captured at `at`.
    pub fn screenshot_path(&self, at: &Timestamp) -> PathBuf {
        let utc = at.naive_utc();
        self.partition_dir(utc.date())
            .join(screenshot_file_name(&utc))
    }

    /// Whether `path` lies under the root once `.` and `..` are resolved
    /// lexically. Guards against traversal through crafted names.
    pub fn contains(&self, path: &Path) -> bool {
        let root = lexical_normalize(&self.root);
        let candidate = if path.is_absolute() {
            lexical_normalize(path)
        } else {
            lexical_normalize(&self.root.join(path))
        };
        candidate.starts_with(root)
    }
}

/// Calendar day (UTC) whose partition holds everything captured at `at`.
pub fn partition_date(at: &Timestamp) -> NaiveDate {
    at.naive_utc().date()
}

/// `YYYYMMDD_HHMMSS.png` for a UTC capture time.
pub fn screenshot_file_name(at: &NaiveDateTime) -> String {
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}.{}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second(),
        SCREENSHOT_EXTENSION
    )
}

/// Recover the capture time from a screenshot file name.
///
/// Returns `None` for anything that does not match `\d{8}_\d{6}\.png`
/// exactly or names an impossible date/time.
pub fn parse_screenshot_name(name: &str) -> Option<NaiveDateTime> {
    let stem = name.strip_suffix(SCREENSHOT_EXTENSION)?.strip_suffix('.')?;
    let bytes = stem.as_bytes();
    if bytes.len() != 15 || bytes[8] != b'_' {
        return None;
    }
    let digits_ok = bytes[..8]
        .iter()
        .chain(&bytes[9..])
        .all(u8::is_ascii_digit);
    if !digits_ok {
        return None;
    }
    let field = |range: std::ops::Range<usize>| stem[range].parse::<u32>().ok();
    let date = NaiveDate::from_ymd_opt(field(0..4)? as i32, field(4..6)?, field(6..8)?)?;
    date.and_hms_opt(field(9..11)?, field(11..13)?, field(13..15)?)
}

/// Parse the `YYYY`, `MM`, `DD` components of a partition directory.
pub fn parse_partition(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let fixed = |s: &str, width: usize| s.len() == width && s.bytes().all(|b| b.is_ascii_digit());
    if !(fixed(year, 4) && fixed(month, 2) && fixed(day, 2)) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> Timestamp {
        chrono::DateTime::parse_from_rfc3339(raw).unwrap()
    }

    #[test]
    fn test_screenshot_path_is_zero_padded() {
        let layout = DateLayout::new("/data/reel");
        let path = layout.screenshot_path(&ts("2026-03-04T05:06:07.891Z"));
        assert_eq!(
            path,
            PathBuf::from("/data/reel/2026/03/04/20260304_050607.png")
        );
    }

    #[test]
    fn test_small_years_keep_four_digits() {
        let layout = DateLayout::new("/r");
        let date = NaiveDate::from_ymd_opt(987, 1, 2).unwrap();
        assert_eq!(layout.partition_dir(date), PathBuf::from("/r/0987/01/02"));
    }

    #[test]
    fn test_partition_follows_utc_not_the_offset() {
        let layout = DateLayout::new("/r");
        // 23:30 local on the 1st is already the 2nd in UTC.
        let at = ts("2026-01-01T23:30:00-05:00");
        assert_eq!(
            layout.screenshot_path(&at),
            PathBuf::from("/r/2026/01/02/20260102_043000.png")
        );
        assert_eq!(partition_date(&at), NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
    }

    #[test]
    fn test_repeated_wall_clock_hour_gets_distinct_paths() {
        let layout = DateLayout::new("/r");
        // 01:30 happens twice on the night daylight saving ends.
        let before = ts("2026-11-01T01:30:00-04:00");
        let after = ts("2026-11-01T01:30:00-05:00");
        assert_eq!((after - before).num_seconds(), 3600);
        assert_ne!(layout.screenshot_path(&before), layout.screenshot_path(&after));
    }

    #[test]
    fn test_same_timestamp_same_path() {
        let layout = DateLayout::new("/r");
        let at = ts("2026-10-17T12:00:00.123+02:00");
        assert_eq!(layout.screenshot_path(&at), layout.screenshot_path(&at));
    }

    #[test]
    fn test_path_precision_is_one_second() {
        let layout = DateLayout::new("/r");
        let a = ts("2026-10-17T12:00:00.100+02:00");
        let b = ts("2026-10-17T12:00:00.900+02:00");
        let c = ts("2026-10-17T12:00:01.100+02:00");
        assert_eq!(layout.screenshot_path(&a), layout.screenshot_path(&b));
        assert_ne!(layout.screenshot_path(&a), layout.screenshot_path(&c));
    }

    #[test]
    fn test_event_log_lives_in_partition() {
        let layout = DateLayout::new("/r");
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(
            layout.event_log_path(date),
            PathBuf::from("/r/2026/10/17/window_data.jsonl")
        );
    }

    #[test]
    fn test_parse_screenshot_name() {
        let parsed = parse_screenshot_name("20261017_091503.png").unwrap();
        assert_eq!(
            screenshot_file_name(&parsed),
            "20261017_091503.png".to_string()
        );
        assert!(parse_screenshot_name("20261017_091503.jpg").is_none());
        assert!(parse_screenshot_name("2026101_0915033.png").is_none());
        assert!(parse_screenshot_name("20261317_091503.png").is_none());
        assert!(parse_screenshot_name("20261017-091503.png").is_none());
        assert!(parse_screenshot_name(".20261017_091503.png.tmp").is_none());
    }

    #[test]
    fn test_parse_partition() {
        assert_eq!(
            parse_partition("2026", "02", "28"),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );
        assert!(parse_partition("2026", "2", "28").is_none());
        assert!(parse_partition("2026", "02", "30").is_none());
    }

    #[test]
    fn test_contains_rejects_traversal() {
        let layout = DateLayout::new("/data/reel");
        assert!(layout.contains(Path::new("/data/reel/2026/10/17/x.png")));
        assert!(layout.contains(Path::new("2026/10/17/x.png")));
        assert!(!layout.contains(Path::new("/data/reel/../etc/passwd")));
        assert!(!layout.contains(Path::new("/data/other/2026")));
    }
}
