use crate::decode::RecordId;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Failure to turn one positional record into an entity.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{entity} record has {actual} fields, expected at least {expected}")]
    RecordTooShort {
        entity: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("field `{field}`: invalid integer {value:?}")]
    MalformedInteger {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("field `{field}`: invalid number {value:?}")]
    MalformedFloat {
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("field `{field}`: invalid date {value:?} (expected YYYY-MM-DD HH:MM)")]
    MalformedDate {
        field: &'static str,
        value: String,
        /// `None` when the token was rejected before reaching chrono.
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("field `{field}`: invalid flag {value:?}")]
    MalformedFlag { field: &'static str, value: String },

    #[error("field `{field}`: no entity with id {id} is registered")]
    UnresolvedReference { field: &'static str, id: RecordId },
}

/// Failure to derive a day count from a task's hour fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DurationError {
    #[error("task {task_code} has {hours} planned hours but no calendar")]
    MissingCalendar { task_code: String, hours: f64 },

    #[error("calendar {clndr_id:?} has no working hours per day")]
    NoDayHours { clndr_id: Option<RecordId> },
}
