// Dashboard configuration: column schema, encodings and panel layout.
pub mod settings;

pub use settings::{ColumnSpec, DashboardSchema, HeaderRepair, PanelLayout, TotalsPolicy};
