use thiserror::Error;

/// Why a dataset load attempt was abandoned.
///
/// Every variant is terminal for that attempt; the currently loaded
/// dataset is left untouched.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("Request failed with status {0}")]
    RequestFailed(u16),

    #[error("{}", malformed_message(.line, .source))]
    MalformedRecord {
        /// 1-based line number for line-delimited input, `None` for a whole document.
        line: Option<usize>,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Unexpected data format. Expecting an array of question objects or a {{ questions: [] }} wrapper."
    )]
    UnsupportedFormat,

    #[error("network error: {0}")]
    Network(String),

    #[error("sample unavailable: {0}")]
    SampleUnavailable(#[from] std::io::Error),
}

fn malformed_message(line: &Option<usize>, source: &serde_json::Error) -> String {
    match line {
        Some(n) => format!("invalid JSON on line {}: {}", n, source),
        None => format!("invalid JSON: {}", source),
    }
}

impl LoadError {
    pub fn malformed(source: serde_json::Error) -> Self {
        Self::MalformedRecord { line: None, source }
    }

    pub fn malformed_line(line: usize, source: serde_json::Error) -> Self {
        Self::MalformedRecord {
            line: Some(line),
            source,
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::RequestFailed(status.as_u16()),
            None => Self::Network(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
