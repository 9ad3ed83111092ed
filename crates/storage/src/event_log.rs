//! Append-only window event log.
//!
//! The day's file is opened for each append and closed afterwards, so no
//! handle outlives a single record. A record and its separator go out in
//! one `write_all` on an `O_APPEND` descriptor. Existing content is never
//! rewritten or truncated.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use deskreel_capture_model::{DateLayout, WindowSnapshot};
use deskreel_common::error::{DeskreelError, DeskreelResult};

/// Appends window snapshots to per-day JSONL logs.
#[derive(Debug, Clone)]
pub struct EventLogWriter {
    layout: DateLayout,
}

impl EventLogWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: DateLayout::new(root),
        }
    }

    pub fn layout(&self) -> &DateLayout {
        &self.layout
    }

    /// Append `snapshot` to the log for `for_date` and return the log path.
    pub fn append(&self, snapshot: &WindowSnapshot, for_date: NaiveDate) -> DeskreelResult<PathBuf> {
        let path = self.layout.event_log_path(for_date);
        append_record(&path, snapshot)?;
        Ok(path)
    }
}

/// Append one record to the log at `path`, creating it and its parent
/// directories as needed.
///
/// If the file does not end with a newline (a previous writer died
/// mid-record) the torn line is terminated first, so this record stays
/// on its own line.
pub fn append_record(path: &Path, snapshot: &WindowSnapshot) -> DeskreelResult<()> {
    let line = snapshot.to_record_line()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            DeskreelError::storage(format!("cannot create {}: {e}", parent.display()))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .read(true)
        .open(path)
        .map_err(|e| DeskreelError::storage(format!("cannot open {}: {e}", path.display())))?;

    let mut buf = Vec::with_capacity(line.len() + 2);
    if ends_mid_record(&mut file)? {
        tracing::warn!(path = %path.display(), "Terminating torn record in event log");
        buf.push(b'\n');
    }
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');

    file.write_all(&buf)
        .and_then(|()| file.flush())
        .map_err(|e| DeskreelError::storage(format!("cannot append to {}: {e}", path.display())))?;
    Ok(())
}

fn ends_mid_record(file: &mut File) -> DeskreelResult<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
