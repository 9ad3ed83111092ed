//! Reading captures back: event log readout and per-day validation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use deskreel_capture_model::{
    parse_partition, parse_records, parse_screenshot_name, DateLayout, RecordError,
    WindowSnapshot, EVENT_LOG_FILE_NAME, SCREENSHOT_EXTENSION,
};
use deskreel_common::error::DeskreelResult;

/// Records decoded from one day's log.
#[derive(Debug, Default)]
pub struct LogReadout {
    pub records: Vec<WindowSnapshot>,
    /// Lines that could not be decoded, with their line numbers.
    pub corrupt: Vec<RecordError>,
}

/// Read a day's log line by line.
///
/// A missing file reads as empty. Undecodable lines are collected in
/// [`LogReadout::corrupt`] and never abort the read.
pub fn read_day_log(path: &Path) -> DeskreelResult<LogReadout> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LogReadout::default()),
        Err(e) => return Err(e.into()),
    };
    // A crash mid-write may split a multi-byte character.
    let content = String::from_utf8_lossy(&bytes);

    let mut readout = LogReadout::default();
    for result in parse_records(&content) {
        match result {
            Ok(record) => readout.records.push(record),
            Err(e) => readout.corrupt.push(e),
        }
    }
    Ok(readout)
}

/// Contents and problems of one date partition.
#[derive(Debug, Clone)]
pub struct DayInventory {
    pub date: NaiveDate,
    pub partition: PathBuf,
    /// Valid screenshot file names, sorted (which is chronological).
    pub screenshots: Vec<String>,
    pub event_log: Option<PathBuf>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl DayInventory {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Inspect the partition for `date` beneath `root`.
pub fn inspect_day(root: &Path, date: NaiveDate) -> DayInventory {
    let partition = DateLayout::new(root).partition_dir(date);
    let mut inventory = DayInventory {
        date,
        partition: partition.clone(),
        screenshots: Vec::new(),
        event_log: None,
        warnings: Vec::new(),
        errors: Vec::new(),
    };

    if !partition.exists() {
        inventory
            .errors
            .push(format!("partition {} does not exist", partition.display()));
        return inventory;
    }
    if !partition.is_dir() {
        inventory
            .errors
            .push(format!("partition {} is not a directory", partition.display()));
        return inventory;
    }

    let entries = match std::fs::read_dir(&partition) {
        Ok(entries) => entries,
        Err(e) => {
            inventory
                .errors
                .push(format!("cannot read {}: {e}", partition.display()));
            return inventory;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        if name == EVENT_LOG_FILE_NAME {
            if path.is_file() {
                inventory.event_log = Some(path);
            } else {
                inventory
                    .errors
                    .push(format!("{} is not a regular file", path.display()));
            }
            continue;
        }

        match parse_screenshot_name(&name) {
            Some(at) if at.date() == date && path.is_file() => inventory.screenshots.push(name),
            Some(_) if !path.is_file() => inventory
                .warnings
                .push(format!("{name} is named like a screenshot but is not a file")),
            Some(at) => inventory.warnings.push(format!(
                "{name} belongs to {} but is stored under {date}",
                at.date()
            )),
            None if name.starts_with('.') && name.ends_with(".tmp") => inventory
                .warnings
                .push(format!("leftover temporary file {name}")),
            None if Path::new(&name)
                .extension()
                .is_some_and(|ext| ext == SCREENSHOT_EXTENSION) =>
            {
                inventory
                    .warnings
                    .push(format!("{name} does not follow the YYYYMMDD_HHMMSS naming"))
            }
            None => inventory.warnings.push(format!("unexpected entry {name}")),
        }
    }

    if inventory.event_log.is_none() && inventory.errors.is_empty() {
        inventory
            .warnings
            .push(format!("no {EVENT_LOG_FILE_NAME} in partition"));
    }
    inventory.screenshots.sort();
    inventory
}

/// All date partitions beneath `root`, oldest first. Directories that do
/// not parse as `YYYY/MM/DD` are skipped.
pub fn list_days(root: &Path) -> DeskreelResult<Vec<NaiveDate>> {
    let mut days = Vec::new();
    if !root.is_dir() {
        return Ok(days);
    }
    for year in subdirs(root)? {
        for month in subdirs(&root.join(&year))? {
            for day in subdirs(&root.join(&year).join(&month))? {
                if let Some(date) = parse_partition(&year, &month, &day) {
                    days.push(date);
                }
            }
        }
    }
    days.sort();
    Ok(days)
}

fn subdirs(dir: &Path) -> DeskreelResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
