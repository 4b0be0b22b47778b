use crate::config::DecodeOptions;
use crate::decode::{FieldReader, RecordId};
use crate::error::ParseError;
use crate::registry::Keyed;
use serde::Serialize;

/// Column order of a PROJWBS record.
pub const WBS_FIELDS: [&str; 12] = [
    "wbs_id",
    "proj_id",
    "obs_id",
    "seq_num",
    "est_wt",
    "proj_node_flag",
    "sum_data_flag",
    "status_code",
    "wbs_short_name",
    "wbs_name",
    "phase_id",
    "parent_wbs_id",
];

/// One node of the work breakdown structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wbs {
    pub wbs_id: Option<RecordId>,
    pub proj_id: Option<RecordId>,
    pub obs_id: Option<RecordId>,
    pub seq_num: Option<RecordId>,
    pub est_wt: Option<f64>,
    pub proj_node_flag: Option<bool>,
    pub sum_data_flag: Option<bool>,
    pub status_code: String,
    pub wbs_short_name: String,
    pub wbs_name: String,
    pub phase_id: Option<RecordId>,
    pub parent_wbs_id: Option<RecordId>,
}

impl Wbs {
    pub fn new(
        wbs_id: RecordId,
        wbs_short_name: impl Into<String>,
        wbs_name: impl Into<String>,
    ) -> Self {
        Self {
            wbs_id: Some(wbs_id),
            proj_id: None,
            obs_id: None,
            seq_num: None,
            est_wt: None,
            proj_node_flag: None,
            sum_data_flag: None,
            status_code: String::new(),
            wbs_short_name: wbs_short_name.into(),
            wbs_name: wbs_name.into(),
            phase_id: None,
            parent_wbs_id: None,
        }
    }

    pub fn with_parent(mut self, parent_wbs_id: RecordId) -> Self {
        self.parent_wbs_id = Some(parent_wbs_id);
        self
    }

    pub fn from_record<S: AsRef<str>>(
        tokens: &[S],
        options: &DecodeOptions,
    ) -> Result<Self, ParseError> {
        let r = FieldReader::new("PROJWBS", &WBS_FIELDS, tokens)?;
        Ok(Self {
            wbs_id: r.int(0)?,
            proj_id: r.int(1)?,
            obs_id: r.int(2)?,
            seq_num: r.int(3)?,
            est_wt: r.float(4)?,
            proj_node_flag: r.flag(5, options.flags)?,
            sum_data_flag: r.flag(6, options.flags)?,
            status_code: r.string(7),
            wbs_short_name: r.string(8),
            wbs_name: r.string(9),
            phase_id: r.int(10)?,
            parent_wbs_id: r.int(11)?,
        })
    }

    /// The project root node carries `proj_node_flag`.
    pub fn is_project_node(&self) -> bool {
        self.proj_node_flag.unwrap_or(false)
    }
}

impl Keyed for Wbs {
    fn key(&self) -> Option<RecordId> {
        self.wbs_id
    }
}
