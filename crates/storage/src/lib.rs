//! deskreel Storage
//!
//! Persists what each capture cycle produces beneath a date-partitioned
//! root:
//!
//! - **Frame Store:** lossless PNG frames, published atomically and never
//!   overwritten
//! - **Event Log:** one JSONL record per cycle, appended to the day's log
//! - **Inventory:** reading a day's log back and validating its partition
//!
//! Nothing in this crate deletes or rewrites existing captures.

pub mod event_log;
pub mod frame_store;
pub mod inventory;

pub use event_log::EventLogWriter;
pub use frame_store::FrameStore;
pub use inventory::{inspect_day, list_days, read_day_log, DayInventory, LogReadout};
