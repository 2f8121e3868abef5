//! # BusyBee Core Library
//!
//! Core logic for BusyBee, a single-user calendar and to-do list. The GUI
//! layer stays out of this crate; everything here takes and returns plain
//! data, and the CLI binary is a thin surface over the same operations.
//!
//! ## Key Components
//!
//! - [`recurrence::expand`]: occurrence expansion for repeating events,
//!   with calendar-aware month-end and leap-year clamping
//! - [`ScheduleStore`]: SQLite persistence for events, tasks, recurrences,
//!   and categories, with defined sort/filter semantics
//! - [`Config`]: TOML configuration deciding the default database path

pub mod error;
pub mod item;
pub mod recurrence;
pub mod storage;

pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use item::{
    Category, Event, Frequency, ItemKind, NewEvent, NewTask, Priority, Recurrence,
    RecurrenceRule, Task,
};
pub use recurrence::expand;
pub use storage::{Config, ScheduleStore, TaskFilter, TaskSort};
