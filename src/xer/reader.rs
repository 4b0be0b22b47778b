use super::{XerError, XerResult};
use csv::{ByteRecord, ReaderBuilder};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;
use tracing::debug;

/// The `ERMHDR` line that opens an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XerHeader {
    pub tokens: Vec<String>,
}

impl XerHeader {
    pub fn version(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn export_date(&self) -> Option<&str> {
        self.tokens.get(1).map(String::as_str)
    }
}

/// One `%T` block: its `%F` column names and raw `%R` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XerTable {
    pub name: String,
    pub fields: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl XerTable {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Rows reordered into `layout`, matched on `%F` column names. Columns the
    /// file does not carry come back as empty tokens, unknown ones are dropped.
    pub fn aligned_rows<'a>(
        &'a self,
        layout: &'a [&'a str],
    ) -> impl Iterator<Item = Vec<&'a str>> + 'a {
        let positions: HashMap<&str, usize> = self
            .fields
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();
        let columns: Vec<Option<usize>> = layout
            .iter()
            .map(|name| positions.get(name).copied())
            .collect();

        self.rows.iter().map(move |row| {
            columns
                .iter()
                .map(|&column| {
                    column
                        .and_then(|idx| row.get(idx))
                        .map(String::as_str)
                        .unwrap_or("")
                })
                .collect()
        })
    }
}

/// A tokenized export, before any entity decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XerDocument {
    pub header: Option<XerHeader>,
    pub tables: Vec<XerTable>,
}

impl XerDocument {
    pub fn from_reader<R: Read>(reader: R) -> XerResult<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut document = XerDocument::default();
        let mut record = ByteRecord::new();

        while reader.read_byte_record(&mut record)? {
            let line = record.position().map(|position| position.line());
            let mut tokens = record.iter().map(|bytes| decode_token(bytes, line));
            let Some(marker) = tokens.next() else {
                continue;
            };
            match marker.as_str() {
                "ERMHDR" => {
                    document.header = Some(XerHeader {
                        tokens: tokens.collect(),
                    });
                }
                "%T" => {
                    let name = tokens
                        .next()
                        .map(|name| name.trim().to_string())
                        .filter(|name| !name.is_empty())
                        .ok_or_else(|| {
                            XerError::InvalidFormat("%T line without a table name".into())
                        })?;
                    debug!(table = %name, "reading table");
                    document.tables.push(XerTable::new(name));
                }
                "%F" => {
                    let table = document.current_table("%F")?;
                    table.fields = tokens.map(|field| field.trim().to_string()).collect();
                }
                "%R" => {
                    let table = document.current_table("%R")?;
                    if table.fields.is_empty() {
                        return Err(XerError::InvalidFormat(format!(
                            "row in table {} before its %F line",
                            table.name
                        )));
                    }
                    table.rows.push(tokens.collect());
                }
                "%E" => break,
                other => debug!(marker = other, "skipping unrecognised line"),
            }
        }

        Ok(document)
    }

    fn current_table(&mut self, marker: &str) -> XerResult<&mut XerTable> {
        self.tables
            .last_mut()
            .ok_or_else(|| XerError::InvalidFormat(format!("{marker} line before any %T")))
    }

    /// First table with this name.
    pub fn table(&self, name: &str) -> Option<&XerTable> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Every table with this name, in file order.
    pub fn tables_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XerTable> + 'a {
        self.tables.iter().filter(move |table| table.name == name)
    }
}

/// Exports are commonly cp1252; bytes that are not UTF-8 become U+FFFD.
fn decode_token(bytes: &[u8], line: Option<u64>) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            debug!(line, token = %text, "replaced invalid UTF-8 in token");
            text
        }
    }
}

impl FromStr for XerDocument {
    type Err = XerError;

    fn from_str(input: &str) -> XerResult<Self> {
        Self::from_reader(input.as_bytes())
    }
}
