//! Token-level decoding shared by the CALENDAR, PROJWBS and TASK builders.
//!
//! A token is "empty" only when it is the empty string. Numeric tokens are
//! trimmed before parsing, date tokens are not: a date with surrounding
//! blanks is malformed.

use crate::config::FlagDecoding;
use crate::error::ParseError;
use chrono::NaiveDateTime;

/// Identifier type used by every XER key column.
pub type RecordId = i64;

/// Textual format of every date column in an export.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn parse_datetime(token: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(token, DATETIME_FORMAT)
}

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Positional view over one record, checked against a named layout.
pub struct FieldReader<'a, S> {
    layout: &'static [&'static str],
    tokens: &'a [S],
}

impl<'a, S: AsRef<str>> FieldReader<'a, S> {
    pub fn new(
        entity: &'static str,
        layout: &'static [&'static str],
        tokens: &'a [S],
    ) -> Result<Self, ParseError> {
        if tokens.len() < layout.len() {
            return Err(ParseError::RecordTooShort {
                entity,
                expected: layout.len(),
                actual: tokens.len(),
            });
        }
        Ok(Self { layout, tokens })
    }

    fn name(&self, idx: usize) -> &'static str {
        self.layout[idx]
    }

    pub fn raw(&self, idx: usize) -> &'a str {
        let tokens: &'a [S] = self.tokens;
        tokens[idx].as_ref()
    }

    pub fn is_empty(&self, idx: usize) -> bool {
        self.raw(idx).is_empty()
    }

    pub fn string(&self, idx: usize) -> String {
        self.raw(idx).trim().to_string()
    }

    pub fn int(&self, idx: usize) -> Result<Option<RecordId>, ParseError> {
        let token = self.raw(idx);
        if token.is_empty() {
            return Ok(None);
        }
        token
            .trim()
            .parse::<RecordId>()
            .map(Some)
            .map_err(|source| ParseError::MalformedInteger {
                field: self.name(idx),
                value: token.to_string(),
                source,
            })
    }

    pub fn float(&self, idx: usize) -> Result<Option<f64>, ParseError> {
        let token = self.raw(idx);
        if token.is_empty() {
            return Ok(None);
        }
        token
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|source| ParseError::MalformedFloat {
                field: self.name(idx),
                value: token.to_string(),
                source,
            })
    }

    pub fn float_or(&self, idx: usize, default: f64) -> Result<f64, ParseError> {
        Ok(self.float(idx)?.unwrap_or(default))
    }

    pub fn flag(&self, idx: usize, mode: FlagDecoding) -> Result<Option<bool>, ParseError> {
        let token = self.raw(idx);
        if token.is_empty() {
            return Ok(None);
        }
        match mode {
            FlagDecoding::Literal => Ok(Some(true)),
            FlagDecoding::Strict => match token.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" | "1" | "true" => Ok(Some(true)),
                "n" | "no" | "0" | "false" => Ok(Some(false)),
                _ => Err(ParseError::MalformedFlag {
                    field: self.name(idx),
                    value: token.to_string(),
                }),
            },
        }
    }

    pub fn datetime(&self, idx: usize) -> Result<Option<NaiveDateTime>, ParseError> {
        let token = self.raw(idx);
        if token.is_empty() {
            return Ok(None);
        }
        // chrono skips leading blanks before numeric fields; exports never carry them.
        if token.starts_with(char::is_whitespace) {
            return Err(ParseError::MalformedDate {
                field: self.name(idx),
                value: token.to_string(),
                source: None,
            });
        }
        parse_datetime(token)
            .map(Some)
            .map_err(|source| ParseError::MalformedDate {
                field: self.name(idx),
                value: token.to_string(),
                source: Some(source),
            })
    }
}
