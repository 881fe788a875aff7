// Turns raw cells into canonical numbers. Cell-level problems never abort a table.
use painel_shared::models::{CanonicalCell, ColumnKind, RawCell};
use painel_shared::utils::brazilian_format;
use serde::Serialize;
use tracing::warn;

use crate::config::DashboardSchema;
use crate::data::raw_table::RawTable;

#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<CanonicalCell>,
}

/// Numeric columns of a `RawTable`, aligned 1:1 by row index and column name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericTable {
    columns: Vec<NumericColumn>,
    rows: usize,
}

impl NumericTable {
    pub fn columns(&self) -> &[NumericColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&NumericColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<CanonicalCell> {
        self.column(column).and_then(|c| c.cells.get(row).copied())
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellIssue {
    pub row: usize,
    pub entity: String,
    pub column: String,
    pub content: String,
}

/// Audit trail of one normalisation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NormalizationReport {
    pub numbers: usize,
    pub missing: usize,
    pub unparseable: Vec<CellIssue>,
}

impl NormalizationReport {
    pub fn unparseable_count(&self) -> usize {
        self.unparseable.len()
    }
}

pub struct Normalizer<'a> {
    schema: &'a DashboardSchema,
}

impl<'a> Normalizer<'a> {
    pub fn new(schema: &'a DashboardSchema) -> Self {
        Self { schema }
    }

    pub fn normalize(&self, raw: &RawTable) -> (NumericTable, NormalizationReport) {
        let mut report = NormalizationReport::default();
        let entity_idx = raw.column_index(&self.schema.entity_column);
        let mut columns = Vec::new();

        for (col, name) in raw.columns().iter().enumerate() {
            let kind = self.schema.kind_of(name);
            if !kind.is_numeric() {
                continue;
            }
            let mut cells = Vec::with_capacity(raw.len());
            for row in 0..raw.len() {
                let Some(source) = raw.row(row) else { break };
                let cell = self.normalize_cell(&source[col], kind);
                match cell {
                    CanonicalCell::Number(_) => report.numbers += 1,
                    CanonicalCell::Missing => report.missing += 1,
                    CanonicalCell::Unparseable => {
                        let entity = entity_idx
                            .map(|idx| source[idx].text().into_owned())
                            .unwrap_or_default();
                        let content = source[col].text().into_owned();
                        warn!(row, %entity, column = %name, %content, "Unparseable numeric cell");
                        report.unparseable.push(CellIssue {
                            row,
                            entity,
                            column: name.clone(),
                            content,
                        });
                    }
                }
                cells.push(cell);
            }
            columns.push(NumericColumn {
                name: name.clone(),
                kind,
                cells,
            });
        }

        (
            NumericTable {
                columns,
                rows: raw.len(),
            },
            report,
        )
    }

    /// Native numbers are trusted as final; only text is parsed and rescaled.
    pub fn normalize_cell(&self, cell: &RawCell, kind: ColumnKind) -> CanonicalCell {
        match cell {
            RawCell::Empty => CanonicalCell::Missing,
            RawCell::Number(v) if v.is_nan() => CanonicalCell::Missing,
            RawCell::Number(v) if v.is_infinite() => CanonicalCell::Unparseable,
            RawCell::Number(v) => CanonicalCell::Number(*v),
            RawCell::Text(text) => normalize_text(text, kind, self.schema),
        }
    }
}

/// Parses one text cell: strips markers, maps sentinels to `Missing`, reads the
/// Brazilian numeral and, for fraction-capable percent columns, rescales values
/// in `(0, 1]` that carried no `%` sign.
pub fn normalize_text(text: &str, kind: ColumnKind, schema: &DashboardSchema) -> CanonicalCell {
    let trimmed = text.trim();
    let had_percent_sign = trimmed.contains('%');
    let parenthesized = trimmed.contains('(') && trimmed.contains(')');

    let cleaned: String = trimmed
        .replace("R$", "")
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | '(' | ')') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() || schema.is_missing_sentinel(&cleaned) || schema.is_missing_sentinel(trimmed) {
        return CanonicalCell::Missing;
    }

    let mut value = match brazilian_format::parse_decimal(&cleaned) {
        Ok(v) if v.is_finite() => v,
        _ => return CanonicalCell::Unparseable,
    };
    if parenthesized {
        value = -value.abs();
    }
    if kind.rescales_fractions() && !had_percent_sign && value.abs() <= 1.0 && value != 0.0 {
        value *= 100.0;
    }
    CanonicalCell::Number(value)
}
