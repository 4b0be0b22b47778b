//! Typed views over the classification columns of a TASK record.
//!
//! Exports store these as P6 codes (`TK_Active`), while some tools write the
//! display label (`In Progress`). Both spellings are accepted.

use serde::Serialize;
use std::fmt;

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($code:literal, $label:literal),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Accepts the storage code or the display label, ignoring
            /// surrounding whitespace. Unknown values yield `None`.
            pub fn parse(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.code() == value || kind.label().eq_ignore_ascii_case(value))
            }

            pub fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

coded_enum! {
    /// Which measure drives the activity percent complete.
    pub enum PercentCompleteType {
        Duration => ("CP_Drtn", "Duration"),
        Units => ("CP_Units", "Units"),
        Physical => ("CP_Phys", "Physical"),
    }
}

coded_enum! {
    pub enum TaskType {
        TaskDependent => ("TT_Task", "Task Dependent"),
        ResourceDependent => ("TT_Rsrc", "Resource Dependent"),
        LevelOfEffort => ("TT_LOE", "Level of Effort"),
        StartMilestone => ("TT_Mile", "Start Milestone"),
        FinishMilestone => ("TT_FinMile", "Finish Milestone"),
        WbsSummary => ("TT_WBS", "WBS Summary"),
    }
}

coded_enum! {
    pub enum DurationType {
        FixedUnitsPerTime => ("DT_FixedRate", "Fixed Units/Time"),
        FixedDuration => ("DT_FixedDrtn", "Fixed Duration"),
        FixedUnits => ("DT_FixedQty", "Fixed Units"),
        FixedDurationAndUnits => ("DT_FixedDUR2", "Fixed Duration and Units"),
    }
}

coded_enum! {
    /// Activity progress. Set once from the record; nothing here transitions it.
    pub enum TaskStatus {
        NotStarted => ("TK_NotStart", "Not Started"),
        InProgress => ("TK_Active", "In Progress"),
        Completed => ("TK_Complete", "Completed"),
    }
}

coded_enum! {
    pub enum ConstraintType {
        StartOn => ("CS_MSO", "Start On"),
        StartOnOrBefore => ("CS_MSOB", "Start On or Before"),
        StartOnOrAfter => ("CS_MSOA", "Start On or After"),
        FinishOn => ("CS_MEO", "Finish On"),
        FinishOnOrBefore => ("CS_MEOB", "Finish On or Before"),
        FinishOnOrAfter => ("CS_MEOA", "Finish On or After"),
        MandatoryStart => ("CS_MANDSTART", "Mandatory Start"),
        MandatoryFinish => ("CS_MANDFIN", "Mandatory Finish"),
        AsLateAsPossible => ("CS_ALAP", "As Late as Possible"),
    }
}

impl TaskType {
    pub fn is_milestone(&self) -> bool {
        matches!(self, TaskType::StartMilestone | TaskType::FinishMilestone)
    }
}

impl ConstraintType {
    /// True for constraints that pin the start rather than the finish date.
    pub fn applies_to_start(&self) -> bool {
        matches!(
            self,
            ConstraintType::StartOn
                | ConstraintType::StartOnOrBefore
                | ConstraintType::StartOnOrAfter
                | ConstraintType::MandatoryStart
        )
    }
}
