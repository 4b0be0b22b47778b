use crate::calendar::Calendar;
use crate::config::DecodeOptions;
use crate::decode::{FieldReader, RecordId};
use crate::error::{DurationError, ParseError};
use crate::fields::{ConstraintType, DurationType, PercentCompleteType, TaskStatus, TaskType};
use crate::registry::{Keyed, Registries, Registry};
use crate::wbs::Wbs;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Column order of a TASK record.
pub const TASK_FIELDS: [&str; 60] = [
    "task_id",
    "proj_id",
    "wbs_id",
    "clndr_id",
    "phys_complete_pct",
    "rev_fdbk_flag",
    "est_wt",
    "lock_plan_flag",
    "auto_compute_act_flag",
    "complete_pct_type",
    "task_type",
    "duration_type",
    "status_code",
    "task_code",
    "task_name",
    "rsrc_id",
    "total_float_hr_cnt",
    "free_float_hr_cnt",
    "remain_drtn_hr_cnt",
    "act_work_qty",
    "remain_work_qty",
    "target_work_qty",
    "target_drtn_hr_cnt",
    "target_equip_qty",
    "act_equip_qty",
    "remain_equip_qty",
    "cstr_date",
    "act_start_date",
    "act_end_date",
    "late_start_date",
    "late_end_date",
    "expect_end_date",
    "early_start_date",
    "early_end_date",
    "restart_date",
    "reend_date",
    "target_start_date",
    "target_end_date",
    "rem_late_start_date",
    "rem_late_end_date",
    "cstr_type",
    "priority_type",
    "suspend_date",
    "resume_date",
    "float_path",
    "float_path_order",
    "guid",
    "tmpl_guid",
    "cstr_date2",
    "cstr_type2",
    "driving_path_flag",
    "act_this_per_work_qty",
    "act_this_per_equip_qty",
    "external_early_start_date",
    "external_late_end_date",
    "create_date",
    "update_date",
    "create_user",
    "update_user",
    "location_id",
];

/// Hours per day assumed when converting float, regardless of calendar.
const FLOAT_HOURS_PER_DAY: f64 = 8.0;

/// One activity of a loaded schedule.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub task_id: Option<RecordId>,
    pub proj_id: Option<RecordId>,
    pub wbs_id: Option<RecordId>,
    pub clndr_id: Option<RecordId>,
    pub phys_complete_pct: Option<f64>,
    pub rev_fdbk_flag: Option<bool>,
    pub est_wt: Option<f64>,
    pub lock_plan_flag: Option<bool>,
    pub auto_compute_act_flag: Option<bool>,
    pub complete_pct_type: String,
    pub task_type: String,
    pub duration_type: String,
    pub status_code: String,
    pub task_code: String,
    pub task_name: String,
    pub rsrc_id: Option<RecordId>,
    pub total_float_hr_cnt: Option<f64>,
    pub free_float_hr_cnt: Option<f64>,
    pub remain_drtn_hr_cnt: f64,
    pub act_work_qty: Option<f64>,
    pub remain_work_qty: Option<f64>,
    pub target_work_qty: Option<f64>,
    pub target_drtn_hr_cnt: f64,
    pub target_equip_qty: Option<f64>,
    pub act_equip_qty: Option<f64>,
    pub remain_equip_qty: Option<f64>,
    pub cstr_date: Option<NaiveDateTime>,
    pub act_start_date: Option<NaiveDateTime>,
    pub act_end_date: Option<NaiveDateTime>,
    pub late_start_date: Option<NaiveDateTime>,
    pub late_end_date: Option<NaiveDateTime>,
    pub expect_end_date: Option<NaiveDateTime>,
    pub early_start_date: Option<NaiveDateTime>,
    pub early_end_date: Option<NaiveDateTime>,
    pub restart_date: Option<NaiveDateTime>,
    pub reend_date: Option<NaiveDateTime>,
    pub target_start_date: Option<NaiveDateTime>,
    pub target_end_date: Option<NaiveDateTime>,
    pub rem_late_start_date: Option<NaiveDateTime>,
    pub rem_late_end_date: Option<NaiveDateTime>,
    pub cstr_type: String,
    pub priority_type: String,
    pub suspend_date: Option<NaiveDateTime>,
    pub resume_date: Option<NaiveDateTime>,
    pub float_path: String,
    pub float_path_order: String,
    pub guid: String,
    pub tmpl_guid: String,
    pub cstr_date2: Option<NaiveDateTime>,
    pub cstr_type2: String,
    pub driving_path_flag: Option<bool>,
    pub act_this_per_work_qty: Option<f64>,
    pub act_this_per_equip_qty: Option<f64>,
    pub external_early_start_date: Option<NaiveDateTime>,
    pub external_late_end_date: Option<NaiveDateTime>,
    pub create_date: String,
    pub update_date: String,
    pub create_user: String,
    pub update_user: String,
    pub location_id: String,
    /// Calendar registered under `clndr_id` when the task was built.
    #[serde(skip)]
    pub calendar: Option<Arc<Calendar>>,
    /// WBS node registered under `wbs_id` when the task was built.
    #[serde(skip)]
    pub wbs: Option<Arc<Wbs>>,
}

/// Primary constraint of a task, as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    #[serde(rename = "ConstraintType")]
    pub constraint_type: String,
    #[serde(rename = "ConstraintDate")]
    pub constraint_date: Option<NaiveDateTime>,
}

/// Builds tasks from positional TASK records against a fixed set of registries.
pub struct TaskBuilder<'a> {
    registries: &'a Registries,
    options: DecodeOptions,
}

impl<'a> TaskBuilder<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self::with_options(registries, DecodeOptions::default())
    }

    pub fn with_options(registries: &'a Registries, options: DecodeOptions) -> Self {
        Self {
            registries,
            options,
        }
    }

    /// Decodes one record of at least `TASK_FIELDS.len()` tokens.
    ///
    /// `clndr_id` and `wbs_id` are resolved here, once. The registries must
    /// already hold every calendar and WBS node the record can refer to.
    pub fn build<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Task, ParseError> {
        let r = FieldReader::new("TASK", &TASK_FIELDS, tokens)?;
        let flags = self.options.flags;

        let wbs_id = r.int(2)?;
        let clndr_id = r.int(3)?;

        // Keyed off remain_drtn_hr_cnt (18), not target_drtn_hr_cnt itself.
        let target_drtn_hr_cnt = if r.is_empty(18) {
            0.0
        } else {
            r.float_or(22, 0.0)?
        };

        // Both external dates are gated on cstr_date2 (48).
        let (external_early_start_date, external_late_end_date) = if r.is_empty(48) {
            (None, None)
        } else {
            (r.datetime(53)?, r.datetime(54)?)
        };

        let calendar = self.resolve(&self.registries.calendars, clndr_id, "clndr_id")?;
        let wbs = self.resolve(&self.registries.wbs, wbs_id, "wbs_id")?;

        Ok(Task {
            task_id: r.int(0)?,
            proj_id: r.int(1)?,
            wbs_id,
            clndr_id,
            phys_complete_pct: r.float(4)?,
            rev_fdbk_flag: r.flag(5, flags)?,
            est_wt: r.float(6)?,
            lock_plan_flag: r.flag(7, flags)?,
            auto_compute_act_flag: r.flag(8, flags)?,
            complete_pct_type: r.string(9),
            task_type: r.string(10),
            duration_type: r.string(11),
            status_code: r.string(12),
            task_code: r.string(13),
            task_name: r.string(14),
            rsrc_id: r.int(15)?,
            total_float_hr_cnt: r.float(16)?,
            free_float_hr_cnt: r.float(17)?,
            remain_drtn_hr_cnt: r.float_or(18, 0.0)?,
            act_work_qty: r.float(19)?,
            remain_work_qty: r.float(20)?,
            target_work_qty: r.float(21)?,
            target_drtn_hr_cnt,
            target_equip_qty: r.float(23)?,
            act_equip_qty: r.float(24)?,
            remain_equip_qty: r.float(25)?,
            cstr_date: r.datetime(26)?,
            act_start_date: r.datetime(27)?,
            act_end_date: r.datetime(28)?,
            late_start_date: r.datetime(29)?,
            late_end_date: r.datetime(30)?,
            expect_end_date: r.datetime(31)?,
            early_start_date: r.datetime(32)?,
            early_end_date: r.datetime(33)?,
            restart_date: r.datetime(34)?,
            reend_date: r.datetime(35)?,
            target_start_date: r.datetime(36)?,
            target_end_date: r.datetime(37)?,
            rem_late_start_date: r.datetime(38)?,
            rem_late_end_date: r.datetime(39)?,
            cstr_type: r.string(40),
            priority_type: r.string(41),
            suspend_date: r.datetime(42)?,
            resume_date: r.datetime(43)?,
            float_path: r.string(44),
            float_path_order: r.string(45),
            guid: r.string(46),
            tmpl_guid: r.string(47),
            cstr_date2: r.datetime(48)?,
            cstr_type2: r.string(49),
            driving_path_flag: r.flag(50, flags)?,
            act_this_per_work_qty: r.float(51)?,
            act_this_per_equip_qty: r.float(52)?,
            external_early_start_date,
            external_late_end_date,
            create_date: r.string(55),
            update_date: r.string(56),
            create_user: r.string(57),
            update_user: r.string(58),
            location_id: r.string(59),
            calendar,
            wbs,
        })
    }

    fn resolve<T: Keyed>(
        &self,
        registry: &Registry<T>,
        id: Option<RecordId>,
        field: &'static str,
    ) -> Result<Option<Arc<T>>, ParseError> {
        let found = registry.find_by_id(id);
        match id {
            Some(id) if found.is_none() && self.options.strict_references => {
                Err(ParseError::UnresolvedReference { field, id })
            }
            _ => Ok(found),
        }
    }
}

impl Task {
    /// Builds a task with default decoding options.
    pub fn from_record<S: AsRef<str>>(
        tokens: &[S],
        registries: &Registries,
    ) -> Result<Self, ParseError> {
        TaskBuilder::new(registries).build(tokens)
    }

    pub fn id(&self) -> Option<RecordId> {
        self.task_id
    }

    /// Total float in 8-hour days; `None` when unset or zero.
    pub fn float(&self) -> Option<f64> {
        self.total_float_hr_cnt
            .filter(|hours| *hours != 0.0)
            .map(|hours| hours / FLOAT_HOURS_PER_DAY)
    }

    /// Planned duration in days on the task's own calendar.
    ///
    /// Zero planned hours is `0.0` without touching the calendar. Otherwise
    /// a calendar with a non-zero `day_hr_cnt` is required.
    pub fn duration(&self) -> Result<f64, DurationError> {
        if self.target_drtn_hr_cnt == 0.0 {
            return Ok(0.0);
        }
        let calendar = self
            .calendar
            .as_deref()
            .ok_or_else(|| DurationError::MissingCalendar {
                task_code: self.task_code.clone(),
                hours: self.target_drtn_hr_cnt,
            })?;
        calendar.days_for_hours(self.target_drtn_hr_cnt)
    }

    pub fn constraints(&self) -> Constraint {
        Constraint {
            constraint_type: self.cstr_type.clone(),
            constraint_date: self.cstr_date,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDateTime> {
        self.act_start_date.or(self.target_start_date)
    }

    /// Actual finish, else the planned *start*. Downstream reports depend on
    /// this fallback, so it does not use `target_end_date`.
    pub fn end_date(&self) -> Option<NaiveDateTime> {
        self.act_end_date.or(self.target_start_date)
    }

    pub fn percent_complete_type(&self) -> Option<PercentCompleteType> {
        PercentCompleteType::parse(&self.complete_pct_type)
    }

    pub fn kind(&self) -> Option<TaskType> {
        TaskType::parse(&self.task_type)
    }

    pub fn duration_kind(&self) -> Option<DurationType> {
        DurationType::parse(&self.duration_type)
    }

    pub fn status(&self) -> Option<TaskStatus> {
        TaskStatus::parse(&self.status_code)
    }

    pub fn constraint_kind(&self) -> Option<ConstraintType> {
        ConstraintType::parse(&self.cstr_type)
    }

    pub fn secondary_constraint_kind(&self) -> Option<ConstraintType> {
        ConstraintType::parse(&self.cstr_type2)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.task_code)
    }
}
