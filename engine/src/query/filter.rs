use std::borrow::Cow;

use painel_shared::models::{CanonicalCell, RawCell};

use crate::data::dataset::Dataset;
use crate::error::QueryError;

/// One categorical filter. `All` matches every row, blank values included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Maps a selector choice to a filter; the "all" label (e.g. "Todos") selects everything.
    pub fn from_choice(choice: &str, all_label: &str) -> Self {
        let choice = choice.trim();
        if choice == all_label.trim() {
            Selection::All
        } else {
            Selection::Only(choice.to_string())
        }
    }

    /// Case-sensitive equality on trimmed text.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => value.trim() == expected,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowFilter {
    pub entity: Selection,
    pub status: Selection,
}

impl RowFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_choices(entity: &str, status: &str, all_label: &str) -> Self {
        RowFilter {
            entity: Selection::from_choice(entity, all_label),
            status: Selection::from_choice(status, all_label),
        }
    }
}

/// A row subset of a dataset. Row positions index both the raw and numeric tables.
#[derive(Debug, Clone)]
pub struct View<'a> {
    pub(super) dataset: &'a Dataset,
    pub(super) rows: Vec<usize>,
}

impl<'a> View<'a> {
    pub fn all(dataset: &'a Dataset) -> Self {
        View {
            dataset,
            rows: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Dataset row indices, in view order.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn entity(&self, pos: usize) -> Cow<'a, str> {
        match self.rows.get(pos) {
            Some(&row) => self.dataset.entity(row),
            None => Cow::Borrowed(""),
        }
    }

    pub fn status(&self, pos: usize) -> Cow<'a, str> {
        match self.rows.get(pos) {
            Some(&row) => self.dataset.status(row),
            None => Cow::Borrowed(""),
        }
    }

    pub fn raw_cell(&self, pos: usize, column: &str) -> Option<&'a RawCell> {
        let row = *self.rows.get(pos)?;
        self.dataset.raw().cell(row, column)
    }

    pub fn numeric_cell(&self, pos: usize, column: &str) -> Result<CanonicalCell, QueryError> {
        let cells = &self
            .dataset
            .numeric()
            .column(column)
            .ok_or_else(|| QueryError::UnknownColumn(column.to_string()))?
            .cells;
        Ok(self
            .rows
            .get(pos)
            .and_then(|&row| cells.get(row).copied())
            .unwrap_or(CanonicalCell::Missing))
    }
}

/// An empty view is a normal outcome ("no matching rows"), not an error.
#[derive(Debug, Clone)]
pub enum FilterResult<'a> {
    Empty,
    Rows(View<'a>),
}

impl<'a> FilterResult<'a> {
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterResult::Empty)
    }

    pub fn len(&self) -> usize {
        match self {
            FilterResult::Empty => 0,
            FilterResult::Rows(view) => view.len(),
        }
    }

    pub fn view(&self) -> Option<&View<'a>> {
        match self {
            FilterResult::Empty => None,
            FilterResult::Rows(view) => Some(view),
        }
    }

    pub fn into_view(self) -> Option<View<'a>> {
        match self {
            FilterResult::Empty => None,
            FilterResult::Rows(view) => Some(view),
        }
    }
}

/// Conjunctive equality filtering over entity and status.
pub fn apply<'a>(dataset: &'a Dataset, filter: &RowFilter) -> FilterResult<'a> {
    let rows: Vec<usize> = (0..dataset.len())
        .filter(|&row| filter.entity.matches(&dataset.entity(row)))
        .filter(|&row| filter.status.matches(&dataset.status(row)))
        .collect();
    if rows.is_empty() {
        FilterResult::Empty
    } else {
        FilterResult::Rows(View { dataset, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::fixtures;

    #[test]
    fn test_selection_from_choice() {
        assert_eq!(Selection::from_choice("Todos", "Todos"), Selection::All);
        assert_eq!(
            Selection::from_choice(" Recife ", "Todos"),
            Selection::Only("Recife".to_string())
        );
    }

    #[test]
    fn test_all_filters_keep_every_entity_row_including_blank_status() {
        let ds = fixtures::dataset();
        let result = apply(&ds, &RowFilter::from_choices("Todos", "Todos", "Todos"));
        assert_eq!(result.len(), ds.len());
        assert_eq!(result.len(), 5);
        let view = result.view().unwrap();
        assert!(view.rows().contains(&3)); // Paulista has no status
    }

    #[test]
    fn test_entity_filter_is_case_sensitive() {
        let ds = fixtures::dataset();
        let result = apply(&ds, &RowFilter::from_choices("Olinda", "Todos", "Todos"));
        assert_eq!(result.len(), 1);
        assert_eq!(result.view().unwrap().entity(0), "Olinda");

        let result = apply(&ds, &RowFilter::from_choices("olinda", "Todos", "Todos"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_status_filter() {
        let ds = fixtures::dataset();
        let result = apply(&ds, &RowFilter::from_choices("Todos", "INADIMPLENTE", "Todos"));
        let view = result.into_view().unwrap();
        assert_eq!(view.rows(), &[1, 4]);
        assert_eq!(view.status(1), "INADIMPLENTE");
    }

    #[test]
    fn test_entity_with_other_status_is_empty_not_error() {
        let ds = fixtures::dataset();
        let result = apply(&ds, &RowFilter::from_choices("Recife", "INADIMPLENTE", "Todos"));
        assert!(result.is_empty());
        assert!(result.view().is_none());
    }

    #[test]
    fn test_view_cells() {
        let ds = fixtures::dataset();
        let view = View::all(&ds);
        assert_eq!(
            view.raw_cell(0, "TOTAL A SER APORTADO"),
            Some(&RawCell::Text("100,00".to_string()))
        );
        assert_eq!(
            view.numeric_cell(0, "TOTAL A SER APORTADO").unwrap(),
            CanonicalCell::Number(100.0)
        );
        assert_eq!(
            view.numeric_cell(0, "ENTE"),
            Err(QueryError::UnknownColumn("ENTE".to_string()))
        );
    }
}
