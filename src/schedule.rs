use crate::decode::RecordId;
use crate::registry::{CalendarRegistry, Registries, WbsRegistry};
use crate::task::Task;
use crate::xer::{XerHeader, XerTable};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// A fully loaded export: the registries tasks were resolved against, the
/// tasks themselves in file order, and any tables not decoded into entities.
#[derive(Debug, Clone)]
pub struct Schedule {
    header: Option<XerHeader>,
    registries: Registries,
    tasks: Vec<Task>,
    task_index: HashMap<RecordId, usize>,
    other_tables: Vec<XerTable>,
}

/// Entity counts for a loaded schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub xer_version: Option<String>,
    pub calendars: usize,
    pub wbs_nodes: usize,
    pub tasks: usize,
    pub unresolved_calendars: usize,
    pub unresolved_wbs: usize,
    pub other_tables: Vec<String>,
}

impl Schedule {
    pub fn new(registries: Registries, tasks: Vec<Task>) -> Self {
        let mut task_index = HashMap::with_capacity(tasks.len());
        for (idx, task) in tasks.iter().enumerate() {
            let Some(id) = task.task_id else {
                continue;
            };
            if task_index.contains_key(&id) {
                warn!(task_id = id, task_code = %task.task_code, "duplicate task id; keeping the first");
                continue;
            }
            task_index.insert(id, idx);
        }

        Self {
            header: None,
            registries,
            tasks,
            task_index,
            other_tables: Vec::new(),
        }
    }

    pub fn with_header(mut self, header: Option<XerHeader>) -> Self {
        self.header = header;
        self
    }

    pub fn with_other_tables(mut self, tables: Vec<XerTable>) -> Self {
        self.other_tables = tables;
        self
    }

    pub fn header(&self) -> Option<&XerHeader> {
        self.header.as_ref()
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn calendars(&self) -> &CalendarRegistry {
        &self.registries.calendars
    }

    pub fn wbs_nodes(&self) -> &WbsRegistry {
        &self.registries.wbs
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn other_tables(&self) -> &[XerTable] {
        &self.other_tables
    }

    pub fn task(&self, task_id: RecordId) -> Option<&Task> {
        self.task_index.get(&task_id).map(|&idx| &self.tasks[idx])
    }

    pub fn task_by_code(&self, task_code: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.task_code == task_code)
    }

    pub fn tasks_in_wbs(&self, wbs_id: RecordId) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(move |task| task.wbs_id == Some(wbs_id))
    }

    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            xer_version: self.header().and_then(XerHeader::version).map(str::to_string),
            calendars: self.calendars().len(),
            wbs_nodes: self.wbs_nodes().len(),
            tasks: self.tasks.len(),
            unresolved_calendars: self
                .tasks
                .iter()
                .filter(|task| task.clndr_id.is_some() && task.calendar.is_none())
                .count(),
            unresolved_wbs: self
                .tasks
                .iter()
                .filter(|task| task.wbs_id.is_some() && task.wbs.is_none())
                .count(),
            other_tables: self
                .other_tables
                .iter()
                .map(|table| table.name.clone())
                .collect(),
        }
    }
}
