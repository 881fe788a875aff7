use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub use painel_shared::models::CellError;

use crate::data::encoding::TextEncoding;

/// One failed decode-and-parse attempt, kept so the final error can list them all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingAttempt {
    pub encoding: TextEncoding,
    pub reason: String,
}

impl fmt::Display for EncodingAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.encoding, self.reason)
    }
}

fn join_attempts(attempts: &[EncodingAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Structural failures. Any of these aborts the whole load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Could not decode '{}' with any supported encoding ({}). Re-save the file as UTF-8 CSV separated by ';'.",
        .path.display(),
        join_attempts(.attempts)
    )]
    UndecodableFile {
        path: PathBuf,
        attempts: Vec<EncodingAttempt>,
    },

    #[error("Missing critical columns: {missing:?}. Columns found: {found:?}")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("The file has no header row")]
    EmptyHeader,

    #[error("Row {row} has {found} cells but the header has {expected} columns")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown numeric column: {0}")]
    UnknownColumn(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}
