use painel_shared::models::{CanonicalCell, RawCell};

use crate::data::encoding::TextEncoding;
use crate::error::LoadError;
use crate::normalize::NumericTable;

/// Columns and entity rows exactly as loaded, after header repair.
/// The totals row, when one was recognised, is kept apart and never counted as an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<RawCell>>,
    totals_row: Option<Vec<RawCell>>,
    encoding: TextEncoding,
}

impl RawTable {
    /// Every row must have exactly one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RawCell>>) -> Result<Self, LoadError> {
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(LoadError::RaggedRow {
                row,
                expected: columns.len(),
                found: cells.len(),
            });
        }
        Ok(RawTable {
            columns,
            rows,
            totals_row: None,
            encoding: TextEncoding::Utf8,
        })
    }

    pub fn with_totals_row(mut self, totals_row: Option<Vec<RawCell>>) -> Self {
        self.totals_row = totals_row;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[RawCell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&RawCell> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &RawCell> + '_> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[col]))
    }

    pub fn totals_row(&self) -> Option<&[RawCell]> {
        self.totals_row.as_deref()
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Copy whose numeric columns hold the already normalised values as native numbers.
    /// Missing cells become empty; unparseable ones keep their original text.
    pub fn with_numbers(&self, numeric: &NumericTable) -> RawTable {
        let mut rebuilt = self.clone();
        for column in numeric.columns() {
            let Some(col) = self.column_index(&column.name) else {
                continue;
            };
            for (row, cell) in rebuilt.rows.iter_mut().zip(&column.cells) {
                match cell {
                    CanonicalCell::Number(v) => row[col] = RawCell::Number(*v),
                    CanonicalCell::Missing => row[col] = RawCell::Empty,
                    CanonicalCell::Unparseable => {}
                }
            }
        }
        rebuilt
    }
}
