use super::reader::XerDocument;
use super::{XerError, XerResult};
use crate::calendar::{CALENDAR_FIELDS, Calendar};
use crate::config::LoaderConfig;
use crate::error::ParseError;
use crate::registry::{Keyed, Registries, Registry};
use crate::schedule::Schedule;
use crate::task::{TASK_FIELDS, Task, TaskBuilder};
use crate::wbs::{WBS_FIELDS, Wbs};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

pub const CALENDAR_TABLE: &str = "CALENDAR";
pub const WBS_TABLE: &str = "PROJWBS";
pub const TASK_TABLE: &str = "TASK";

pub fn load_schedule_from_path<P: AsRef<Path>>(
    path: P,
    config: &LoaderConfig,
) -> XerResult<Schedule> {
    let file = File::open(path)?;
    load_schedule_from_reader(BufReader::new(file), config)
}

pub fn load_schedule_from_reader<R: Read>(reader: R, config: &LoaderConfig) -> XerResult<Schedule> {
    let document = XerDocument::from_reader(reader)?;
    load_schedule(document, config)
}

pub fn load_schedule_from_str(input: &str, config: &LoaderConfig) -> XerResult<Schedule> {
    load_schedule_from_reader(input.as_bytes(), config)
}

/// Decodes a tokenized export into a [`Schedule`].
///
/// Calendars and WBS nodes are registered first, whatever their position
/// in the file, so every TASK row resolves against complete registries.
pub fn load_schedule(document: XerDocument, config: &LoaderConfig) -> XerResult<Schedule> {
    let calendars = decode_registry(&document, CALENDAR_TABLE, &CALENDAR_FIELDS, |tokens| {
        Calendar::from_record(tokens, &config.decode)
    })?;
    let wbs = decode_registry(&document, WBS_TABLE, &WBS_FIELDS, |tokens| {
        Wbs::from_record(tokens, &config.decode)
    })?;
    let registries = Registries::new(calendars, wbs);

    let tasks = build_tasks(&document, &registries, config)?;
    report_unresolved(&tasks);

    let XerDocument { header, tables } = document;
    let other_tables = tables
        .into_iter()
        .filter(|table| ![CALENDAR_TABLE, WBS_TABLE, TASK_TABLE].contains(&table.name.as_str()))
        .collect();

    let schedule = Schedule::new(registries, tasks)
        .with_header(header)
        .with_other_tables(other_tables);
    info!(
        calendars = schedule.calendars().len(),
        wbs_nodes = schedule.wbs_nodes().len(),
        tasks = schedule.tasks().len(),
        "schedule loaded"
    );
    Ok(schedule)
}

fn record_error(table: &str, idx: usize, source: ParseError) -> XerError {
    XerError::Record {
        table: table.to_string(),
        row: idx + 1,
        source,
    }
}

fn decode_registry<T, F>(
    document: &XerDocument,
    table_name: &'static str,
    layout: &'static [&'static str],
    decode: F,
) -> XerResult<Registry<T>>
where
    T: Keyed,
    F: Fn(&[&str]) -> Result<T, ParseError>,
{
    let mut registry = Registry::new();
    for table in document.tables_named(table_name) {
        for (idx, tokens) in table.aligned_rows(layout).enumerate() {
            let entity = decode(tokens.as_slice())
                .map_err(|source| record_error(table_name, idx, source))?;
            if !registry.insert(entity) {
                warn!(table = table_name, row = idx + 1, "row has no id and was skipped");
            }
        }
    }
    debug!(table = table_name, count = registry.len(), "registry populated");
    Ok(registry)
}

/// Builds every TASK row against the frozen registries. Output keeps file
/// order; on the parallel path the error reported is from some failing row,
/// not necessarily the first. Error rows are numbered within their table.
fn build_tasks(
    document: &XerDocument,
    registries: &Registries,
    config: &LoaderConfig,
) -> XerResult<Vec<Task>> {
    let builder = TaskBuilder::with_options(registries, config.decode);
    let rows: Vec<(usize, Vec<&str>)> = document
        .tables_named(TASK_TABLE)
        .flat_map(|table| table.aligned_rows(&TASK_FIELDS).enumerate())
        .collect();

    let build = |(idx, tokens): &(usize, Vec<&str>)| {
        builder
            .build(tokens.as_slice())
            .map_err(|source| record_error(TASK_TABLE, *idx, source))
    };

    if config.parallel_tasks && rows.len() >= config.parallel_threshold {
        debug!(rows = rows.len(), "building tasks in parallel");
        rows.par_iter().map(build).collect()
    } else {
        rows.iter().map(build).collect()
    }
}

fn report_unresolved(tasks: &[Task]) {
    let mut missing_calendars = 0usize;
    let mut missing_wbs = 0usize;
    for task in tasks {
        if task.clndr_id.is_some() && task.calendar.is_none() {
            missing_calendars += 1;
            debug!(task_code = %task.task_code, clndr_id = ?task.clndr_id, "calendar not found");
        }
        if task.wbs_id.is_some() && task.wbs.is_none() {
            missing_wbs += 1;
            debug!(task_code = %task.task_code, wbs_id = ?task.wbs_id, "WBS node not found");
        }
    }
    if missing_calendars > 0 {
        warn!(tasks = missing_calendars, "calendar references left unresolved");
    }
    if missing_wbs > 0 {
        warn!(tasks = missing_wbs, "WBS references left unresolved");
    }
}
