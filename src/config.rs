use crate::xer::XerError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// How flag columns (`*_flag`, `rsrc_private`) are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagDecoding {
    /// Any non-empty token is `true`, so a literal `N` also reads as `true`.
    /// Matches what existing consumers of these exports expect.
    #[default]
    Literal,
    /// `Y`/`1`/`true`/`yes` and `N`/`0`/`false`/`no`; anything else is an error.
    Strict,
}

/// Per-record decoding behaviour shared by every entity builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub flags: FlagDecoding,
    /// Fail a task whose non-null `clndr_id`/`wbs_id` is not registered
    /// instead of leaving the association empty.
    pub strict_references: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub decode: DecodeOptions,
    pub parallel_tasks: bool,
    /// Minimum TASK row count before rows are built on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            decode: DecodeOptions::default(),
            parallel_tasks: true,
            parallel_threshold: 512,
        }
    }
}

impl LoaderConfig {
    pub fn sequential() -> Self {
        Self {
            parallel_tasks: false,
            ..Self::default()
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, XerError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, XerError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}
