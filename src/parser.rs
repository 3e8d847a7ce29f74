//! Turns raw dataset text into loosely-typed records.
//!
//! Two payload families are accepted: line-delimited JSON (one value per
//! non-blank line) and a single JSON document that is either a top-level
//! array or a `{ "questions": [...] }` wrapper. Nothing here interprets
//! the records; see [`crate::normalize`] for that.

use serde_json::Value;

use crate::error::{LoadError, Result};

/// File suffixes that select line-delimited parsing.
pub const LINE_DELIMITED_EXTENSIONS: [&str; 3] = [".jsonl", ".ndjson", ".jl"];

/// One record as it appeared in the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Null,
    Text(String),
    /// Fields in the order they were written.
    Object(Vec<(String, Value)>),
    /// Numbers, booleans and nested arrays.
    Other(Value),
}

impl From<Value> for RawRecord {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => RawRecord::Null,
            Value::String(s) => RawRecord::Text(s),
            Value::Object(map) => RawRecord::Object(map.into_iter().collect()),
            other => RawRecord::Other(other),
        }
    }
}

pub fn is_line_delimited(file_hint: &str) -> bool {
    let lower = file_hint.to_ascii_lowercase();
    LINE_DELIMITED_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Parses `text`, using `file_hint` (a path or file name) to pick the format.
///
/// A single bad line fails the whole parse; no partial result is returned.
pub fn parse_records(text: &str, file_hint: &str) -> Result<Vec<RawRecord>> {
    if is_line_delimited(file_hint) {
        return parse_lines(text);
    }
    let doc: Value = serde_json::from_str(text.trim()).map_err(LoadError::malformed)?;
    match doc {
        Value::Array(items) => Ok(into_records(items)),
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => Ok(into_records(items)),
            _ => Err(LoadError::UnsupportedFormat),
        },
        _ => Err(LoadError::UnsupportedFormat),
    }
}

fn parse_lines(text: &str) -> Result<Vec<RawRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Value>(line)
                .map(RawRecord::from)
                .map_err(|e| LoadError::malformed_line(i + 1, e))
        })
        .collect()
}

fn into_records(items: Vec<Value>) -> Vec<RawRecord> {
    items.into_iter().map(RawRecord::from).collect()
}
