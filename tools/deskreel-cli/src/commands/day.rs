//! Validate and summarize one stored day.

use chrono::{NaiveDate, Utc};
use deskreel_storage::{inspect_day, list_days, read_day_log};

use super::ConfigArgs;

pub fn run(date: Option<NaiveDate>, config: ConfigArgs) -> anyhow::Result<()> {
    let root = config.resolve()?.config.storage_root;
    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    println!("Inspecting {date} under {}", root.display());
    let inventory = inspect_day(&root, date);

    println!("  Screenshots: {}", inventory.screenshots.len());
    if let (Some(first), Some(last)) = (inventory.screenshots.first(), inventory.screenshots.last()) {
        println!("    first: {first}");
        println!("    last:  {last}");
    }

    match &inventory.event_log {
        Some(path) => {
            let readout = read_day_log(path)?;
            let flagged = readout
                .records
                .iter()
                .filter(|r| r.is_error_flagged())
                .count();
            println!(
                "  Log records: {} ({} error-flagged, {} corrupt lines)",
                readout.records.len(),
                flagged,
                readout.corrupt.len()
            );
            for bad in &readout.corrupt {
                println!("    line {}: {}", bad.line, bad.error);
            }
        }
        None => println!("  Log records: none"),
    }

    for warning in &inventory.warnings {
        println!("  [WARN] {warning}");
    }
    for error in &inventory.errors {
        println!("  [ERROR] {error}");
    }

    if !inventory.is_valid() {
        let known = list_days(&root).unwrap_or_default();
        if let Some(latest) = known.last() {
            println!("\n{} day(s) on disk, latest {latest}.", known.len());
        }
        anyhow::bail!("day {date} is not valid");
    }

    println!("\nDay is valid.");
    Ok(())
}
