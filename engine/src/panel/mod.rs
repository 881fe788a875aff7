// KPI cards and detail tabs for the presentation surface, all pre-formatted.
use serde::Serialize;
use tracing::warn;

use crate::data::dataset::Dataset;
use crate::error::QueryError;
use crate::format::{format_cell, format_currency, MISSING_MARK};
use crate::query::{FilterResult, RowFilter, Selection, SortOrder, View};

pub const NO_DATA_MESSAGE: &str = "Sem dados.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateioMode {
    #[default]
    Percent,
    Amount,
}

#[derive(Debug, Clone, Default)]
pub struct PanelOptions {
    pub rateio: RateioMode,
    /// Numeric column to order tab rows by.
    pub sort_by: Option<String>,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelReport {
    pub rows: usize,
    pub kpis: Vec<KpiCard>,
    pub court_totals: Vec<KpiCard>,
    pub tabs: Vec<PanelTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Panel {
    Empty { message: String },
    Ready(PanelReport),
}

pub fn build_panel(
    dataset: &Dataset,
    row_filter: &RowFilter,
    options: &PanelOptions,
) -> Result<Panel, QueryError> {
    let view = match dataset.filter(row_filter) {
        FilterResult::Empty => {
            return Ok(Panel::Empty {
                message: NO_DATA_MESSAGE.to_string(),
            })
        }
        FilterResult::Rows(view) => view,
    };
    let view = match &options.sort_by {
        Some(column) => view.sorted_by(column, options.order)?,
        None => view,
    };

    let schema = dataset.schema();
    let layout = &schema.panel;

    // Taken in file order, independent of how the tabs are sorted.
    let status = match (&row_filter.entity, &row_filter.status) {
        (Selection::All, _) => schema.multiple_label.clone(),
        (Selection::Only(_), Selection::Only(status)) => status.clone(),
        (Selection::Only(entity), Selection::All) => {
            dataset.status_for_entity(entity).unwrap_or_default()
        }
    };
    let kpis = vec![
        currency_kpi(&view, "Total a Ser Aportado", &layout.total_due),
        currency_kpi(&view, "Valor Aportado", &layout.contributed),
        currency_kpi(&view, "Saldo Remanescente", &layout.remaining),
        KpiCard {
            label: "Status".to_string(),
            value: status,
        },
    ];

    let court_totals = layout
        .court_totals
        .iter()
        .map(|court| currency_kpi(&view, &format!("{} (R$)", court), court))
        .collect();

    let rateio_columns = match options.rateio {
        RateioMode::Percent => &layout.rateio_percent_tab,
        RateioMode::Amount => &layout.rateio_amount_tab,
    };
    let tabs = vec![
        detail_table(&view, "RCL/Aporte", &layout.rcl_tab),
        detail_table(&view, "Aportes", &layout.aportes_tab),
        detail_table(&view, "Rateio", rateio_columns),
        detail_table(&view, "Dívida", &layout.divida_tab),
    ];

    Ok(Panel::Ready(PanelReport {
        rows: view.len(),
        kpis,
        court_totals,
        tabs,
    }))
}

fn currency_kpi(view: &View<'_>, label: &str, column: &str) -> KpiCard {
    let value = match view.sum(column) {
        Ok(sum) => format_currency(sum.total),
        Err(e) => {
            warn!(column, error = %e, "KPI column unavailable");
            MISSING_MARK.to_string()
        }
    };
    KpiCard {
        label: label.to_string(),
        value,
    }
}

/// First column is the entity; absent columns are left out of the tab.
pub fn detail_table(view: &View<'_>, title: &str, columns: &[String]) -> PanelTable {
    let dataset = view.dataset();
    let schema = dataset.schema();
    let present: Vec<&String> = columns
        .iter()
        .filter(|column| {
            let found = dataset.raw().column_index(column).is_some();
            if !found {
                warn!(tab = title, column = %column, "Column not in file; omitted from tab");
            }
            found
        })
        .collect();

    let mut headers = Vec::with_capacity(present.len() + 1);
    headers.push(schema.entity_column.clone());
    headers.extend(present.iter().map(|c| c.to_string()));

    let rows = (0..view.len())
        .map(|pos| {
            let mut row = Vec::with_capacity(headers.len());
            row.push(view.entity(pos).into_owned());
            for column in &present {
                row.push(render_cell(view, pos, column));
            }
            row
        })
        .collect();

    PanelTable {
        title: title.to_string(),
        headers,
        rows,
    }
}

fn render_cell(view: &View<'_>, pos: usize, column: &str) -> String {
    match view.dataset().schema().kind_of(column).notation() {
        Some(notation) => view
            .numeric_cell(pos, column)
            .map(|cell| format_cell(cell, notation))
            .unwrap_or_else(|_| MISSING_MARK.to_string()),
        None => view
            .raw_cell(pos, column)
            .map(|cell| cell.text().into_owned())
            .unwrap_or_else(|| MISSING_MARK.to_string()),
    }
}
