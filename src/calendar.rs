use crate::config::DecodeOptions;
use crate::decode::{FieldReader, RecordId};
use crate::error::{DurationError, ParseError};
use crate::registry::Keyed;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Column order of a CALENDAR record.
pub const CALENDAR_FIELDS: [&str; 13] = [
    "clndr_id",
    "default_flag",
    "clndr_name",
    "proj_id",
    "base_clndr_id",
    "last_chng_date",
    "clndr_type",
    "day_hr_cnt",
    "week_hr_cnt",
    "month_hr_cnt",
    "year_hr_cnt",
    "rsrc_private",
    "clndr_data",
];

/// A working-time calendar. Tasks use `day_hr_cnt` to turn planned hours
/// into days; the detailed work-week in `clndr_data` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calendar {
    pub clndr_id: Option<RecordId>,
    pub default_flag: Option<bool>,
    pub clndr_name: String,
    pub proj_id: Option<RecordId>,
    pub base_clndr_id: Option<RecordId>,
    pub last_chng_date: Option<NaiveDateTime>,
    pub clndr_type: String,
    pub day_hr_cnt: Option<f64>,
    pub week_hr_cnt: Option<f64>,
    pub month_hr_cnt: Option<f64>,
    pub year_hr_cnt: Option<f64>,
    pub rsrc_private: Option<bool>,
    pub clndr_data: String,
}

impl Calendar {
    pub fn new(clndr_id: RecordId, clndr_name: impl Into<String>, day_hr_cnt: f64) -> Self {
        Self {
            clndr_id: Some(clndr_id),
            default_flag: None,
            clndr_name: clndr_name.into(),
            proj_id: None,
            base_clndr_id: None,
            last_chng_date: None,
            clndr_type: String::new(),
            day_hr_cnt: Some(day_hr_cnt),
            week_hr_cnt: None,
            month_hr_cnt: None,
            year_hr_cnt: None,
            rsrc_private: None,
            clndr_data: String::new(),
        }
    }

    pub fn from_record<S: AsRef<str>>(
        tokens: &[S],
        options: &DecodeOptions,
    ) -> Result<Self, ParseError> {
        let r = FieldReader::new("CALENDAR", &CALENDAR_FIELDS, tokens)?;
        Ok(Self {
            clndr_id: r.int(0)?,
            default_flag: r.flag(1, options.flags)?,
            clndr_name: r.string(2),
            proj_id: r.int(3)?,
            base_clndr_id: r.int(4)?,
            last_chng_date: r.datetime(5)?,
            clndr_type: r.string(6),
            day_hr_cnt: r.float(7)?,
            week_hr_cnt: r.float(8)?,
            month_hr_cnt: r.float(9)?,
            year_hr_cnt: r.float(10)?,
            rsrc_private: r.flag(11, options.flags)?,
            clndr_data: r.string(12),
        })
    }

    /// Converts working hours into working days on this calendar.
    pub fn days_for_hours(&self, hours: f64) -> Result<f64, DurationError> {
        match self.day_hr_cnt {
            Some(per_day) if per_day != 0.0 => Ok(hours / per_day),
            _ => Err(DurationError::NoDayHours {
                clndr_id: self.clndr_id,
            }),
        }
    }
}

impl Keyed for Calendar {
    fn key(&self) -> Option<RecordId> {
        self.clndr_id
    }
}
