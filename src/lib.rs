pub mod calendar;
pub mod config;
pub mod decode;
pub mod error;
pub mod fields;
#[cfg(feature = "cli")]
pub mod logging;
pub mod registry;
pub mod schedule;
pub mod task;
pub mod wbs;
pub mod xer;

pub use calendar::Calendar;
pub use config::{DecodeOptions, FlagDecoding, LoaderConfig};
pub use error::{DurationError, ParseError};
pub use registry::{CalendarRegistry, Registries, Registry, WbsRegistry};
pub use schedule::{LoadSummary, Schedule};
pub use task::{Constraint, Task, TaskBuilder};
pub use wbs::Wbs;
pub use xer::{
    XerDocument, XerError, load_schedule, load_schedule_from_path, load_schedule_from_reader,
    load_schedule_from_str,
};
