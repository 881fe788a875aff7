use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use painel_shared::models::SourceStamp;

use crate::config::DashboardSchema;
use crate::data::csv_parser::BrazilianCsvParser;
use crate::data::raw_table::RawTable;
use crate::error::LoadError;
use crate::normalize::{NormalizationReport, Normalizer, NumericTable};
use crate::query::{distinct_sorted, filter, FilterResult, RowFilter};

/// One load of the debtor file: raw and numeric views plus the normalisation audit.
/// Immutable once built; filters only ever produce row subsets of it.
#[derive(Debug, Clone)]
pub struct Dataset {
    stamp: Option<SourceStamp>,
    schema: Arc<DashboardSchema>,
    raw: RawTable,
    numeric: NumericTable,
    report: NormalizationReport,
}

impl Dataset {
    pub fn load(path: &Path, schema: Arc<DashboardSchema>) -> Result<Self, LoadError> {
        let stamp = source_stamp(path)?;
        let raw = BrazilianCsvParser::new(&schema).load_path(path)?;
        let mut dataset = Self::from_raw(raw, schema);
        dataset.stamp = Some(stamp);
        Ok(dataset)
    }

    pub fn from_raw(raw: RawTable, schema: Arc<DashboardSchema>) -> Self {
        let (numeric, report) = Normalizer::new(&schema).normalize(&raw);
        if report.unparseable_count() > 0 {
            tracing::warn!(
                unparseable = report.unparseable_count(),
                "Some numeric cells could not be read and will show as '-'"
            );
        }
        Dataset {
            stamp: None,
            schema,
            raw,
            numeric,
            report,
        }
    }

    pub fn stamp(&self) -> Option<&SourceStamp> {
        self.stamp.as_ref()
    }

    pub fn schema(&self) -> &DashboardSchema {
        &self.schema
    }

    pub fn raw(&self) -> &RawTable {
        &self.raw
    }

    pub fn numeric(&self) -> &NumericTable {
        &self.numeric
    }

    pub fn report(&self) -> &NormalizationReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn entity(&self, row: usize) -> Cow<'_, str> {
        self.categorical(row, &self.schema.entity_column)
    }

    pub fn status(&self, row: usize) -> Cow<'_, str> {
        self.categorical(row, &self.schema.status_column)
    }

    fn categorical(&self, row: usize, column: &str) -> Cow<'_, str> {
        self.raw
            .cell(row, column)
            .map(|cell| cell.text())
            .unwrap_or_default()
    }

    /// Distinct entity names for selectors, in accent-insensitive order.
    pub fn entities(&self) -> Vec<String> {
        distinct_sorted((0..self.len()).map(|row| self.entity(row).into_owned()))
    }

    pub fn statuses(&self) -> Vec<String> {
        distinct_sorted(
            (0..self.len())
                .map(|row| self.status(row).into_owned())
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn filter(&self, row_filter: &RowFilter) -> FilterResult<'_> {
        filter::apply(self, row_filter)
    }

    /// Status of the first row whose entity matches exactly.
    pub fn status_for_entity(&self, entity: &str) -> Option<String> {
        (0..self.len())
            .find(|&row| self.entity(row) == entity.trim())
            .map(|row| self.status(row).into_owned())
    }
}

pub fn source_stamp(path: &Path) -> Result<SourceStamp, LoadError> {
    let io_err = |source: std::io::Error| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = fs::metadata(path).map_err(io_err)?;
    let modified = metadata.modified().map_err(io_err)?;
    Ok(SourceStamp {
        path: path.to_path_buf(),
        modified: DateTime::<Utc>::from(modified),
        len: metadata.len(),
    })
}
