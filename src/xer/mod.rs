use crate::error::ParseError;
use std::io;
use thiserror::Error;

pub mod loader;
pub mod reader;

pub use loader::{
    load_schedule, load_schedule_from_path, load_schedule_from_reader, load_schedule_from_str,
};
pub use reader::{XerDocument, XerHeader, XerTable};

#[derive(Debug, Error)]
pub enum XerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("tokenizer error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("malformed XER file: {0}")]
    InvalidFormat(String),

    #[error("table {table} row {row}: {source}")]
    Record {
        table: String,
        row: usize,
        #[source]
        source: ParseError,
    },
}

pub type XerResult<T> = Result<T, XerError>;
