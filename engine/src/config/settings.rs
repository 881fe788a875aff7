// Schema of one revision of the debtor spreadsheet. Loaded once and shared read-only.
use std::fs;
use std::path::Path;

use painel_shared::models::ColumnKind;
use painel_shared::utils::collation::sort_key_without_accents;
use serde::{Deserialize, Serialize};

use crate::data::encoding::TextEncoding;
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSchema {
    pub version: String,
    pub delimiter: String, // Single ASCII character, kept as a string for JSON
    pub encodings: Vec<TextEncoding>,
    pub entity_column: String,
    pub status_column: String,
    pub critical_columns: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default = "default_numeric_kind")]
    pub default_numeric_kind: ColumnKind,
    pub missing_sentinels: Vec<String>,
    #[serde(default)]
    pub header_repairs: Vec<HeaderRepair>,
    pub all_label: String,
    pub multiple_label: String,
    pub totals: TotalsPolicy,
    #[serde(default = "default_true")]
    pub infer_native_numbers: bool,
    pub panel: PanelLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderRepair {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsPolicy {
    /// Entity names (accent/case-insensitive prefixes) that mark a trailing totals row.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Drop the last row by position when no totals row was recognised by content.
    #[serde(default = "default_true")]
    pub drop_last_row_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub total_due: String,
    pub contributed: String,
    pub remaining: String,
    pub court_totals: Vec<String>,
    pub rcl_tab: Vec<String>,
    pub aportes_tab: Vec<String>,
    pub rateio_percent_tab: Vec<String>,
    pub rateio_amount_tab: Vec<String>,
    pub divida_tab: Vec<String>,
}

fn default_numeric_kind() -> ColumnKind {
    ColumnKind::Currency
}

fn default_true() -> bool {
    true
}

impl DashboardSchema {
    /// The schema for the current spreadsheet revision, embedded at build time.
    pub fn load_default() -> Result<Self, EngineError> {
        let config_str = include_str!("../../config/default.json");
        Self::from_json_str(config_str)
    }

    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let config_str = fs::read_to_string(path)?;
        Self::from_json_str(&config_str)
    }

    pub fn from_json_str(config_str: &str) -> Result<Self, EngineError> {
        let schema: DashboardSchema = serde_json::from_str(config_str)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let delimiter = self.delimiter.as_bytes();
        if delimiter.len() != 1 {
            return Err(EngineError::ConfigError(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if self.encodings.is_empty() {
            return Err(EngineError::ConfigError(
                "at least one encoding must be listed".to_string(),
            ));
        }
        for key in [&self.entity_column, &self.status_column] {
            if self.kind_of(key) != ColumnKind::Categorical {
                return Err(EngineError::ConfigError(format!(
                    "key column '{}' must be categorical",
                    key
                )));
            }
            if !self.critical_columns.contains(key) {
                return Err(EngineError::ConfigError(format!(
                    "key column '{}' must be listed as critical",
                    key
                )));
            }
        }
        if self.default_numeric_kind == ColumnKind::Categorical {
            return Err(EngineError::ConfigError(
                "default_numeric_kind cannot be categorical".to_string(),
            ));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b';')
    }

    /// Explicit entry wins; key columns are always categorical; anything else is numeric.
    pub fn kind_of(&self, column: &str) -> ColumnKind {
        if let Some(spec) = self.columns.iter().find(|c| c.name == column) {
            return spec.kind;
        }
        if column == self.entity_column || column == self.status_column {
            return ColumnKind::Categorical;
        }
        self.default_numeric_kind
    }

    pub fn is_missing_sentinel(&self, text: &str) -> bool {
        let text = text.trim();
        self.missing_sentinels.iter().any(|s| s.trim() == text)
    }

    pub fn is_totals_label(&self, entity: &str) -> bool {
        let key = sort_key_without_accents(entity.trim());
        self.totals
            .labels
            .iter()
            .map(|label| sort_key_without_accents(label.trim()))
            .any(|label| !label.is_empty() && key.starts_with(&label))
    }
}
