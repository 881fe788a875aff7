use std::borrow::Cow;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cell exactly as the loader produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawCell {
    Empty,
    Text(String),
    /// Inferred by the reader; trusted as already being in its final scale.
    Number(f64),
}

impl RawCell {
    pub fn from_field(field: &str) -> Self {
        if field.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(field.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Number(_) => false,
        }
    }

    /// Trimmed textual form, used for categorical display and equality.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            RawCell::Empty => Cow::Borrowed(""),
            RawCell::Text(s) => Cow::Borrowed(s.trim()),
            RawCell::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

/// Per-cell diagnostic. Both render as "-" but only `Unparseable` is a data defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    Missing,
    Unparseable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CanonicalCell {
    Number(f64),
    Missing,
    Unparseable,
}

impl CanonicalCell {
    pub fn value(&self) -> Option<f64> {
        match self {
            CanonicalCell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<CellError> {
        match self {
            CanonicalCell::Number(_) => None,
            CanonicalCell::Missing => Some(CellError::Missing),
            CanonicalCell::Unparseable => Some(CellError::Unparseable),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Categorical,
    Currency,
    /// Stored as a fraction (0.066 means 6.6%).
    PercentFraction,
    PercentAlreadyScaled,
    /// Could be either; text values at or below 1.0 are read as fractions.
    PercentAmbiguous,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnKind::Categorical)
    }

    pub fn rescales_fractions(self) -> bool {
        matches!(self, ColumnKind::PercentFraction | ColumnKind::PercentAmbiguous)
    }

    pub fn notation(self) -> Option<Notation> {
        match self {
            ColumnKind::Categorical => None,
            ColumnKind::Currency => Some(Notation::Currency),
            ColumnKind::PercentFraction
            | ColumnKind::PercentAlreadyScaled
            | ColumnKind::PercentAmbiguous => Some(Notation::Percent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notation {
    Currency,
    Percent,
}

/// Identity of a source file on disk, used as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceStamp {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    pub len: u64,
}
