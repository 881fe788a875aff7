use std::cmp::Ordering;

use painel_shared::models::CanonicalCell;
use serde::Serialize;

use super::filter::View;
use crate::error::QueryError;

/// Sum that ignores non-numbers but keeps count of what it skipped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ColumnSum {
    pub total: f64,
    pub counted: usize,
    pub missing: usize,
    pub unparseable: usize,
}

impl ColumnSum {
    pub fn from_cells<I: IntoIterator<Item = CanonicalCell>>(cells: I) -> Self {
        cells.into_iter().fold(ColumnSum::default(), |mut acc, cell| {
            match cell {
                CanonicalCell::Number(v) => {
                    acc.total += v;
                    acc.counted += 1;
                }
                CanonicalCell::Missing => acc.missing += 1,
                CanonicalCell::Unparseable => acc.unparseable += 1,
            }
            acc
        })
    }

    pub fn skipped(&self) -> usize {
        self.missing + self.unparseable
    }

    pub fn as_cell(&self) -> CanonicalCell {
        CanonicalCell::Number(self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl<'a> View<'a> {
    pub fn sum(&self, column: &str) -> Result<ColumnSum, QueryError> {
        let cells = self.column_cells(column)?;
        Ok(ColumnSum::from_cells(self.rows.iter().map(|&row| cells[row])))
    }

    /// Reorders the view by a numeric column. Non-numbers go last in either
    /// order and ties keep their current order, so raw and numeric rows stay paired.
    pub fn sorted_by(&self, column: &str, order: SortOrder) -> Result<View<'a>, QueryError> {
        let cells = self.column_cells(column)?;
        let mut rows = self.rows.clone();
        rows.sort_by(|&a, &b| match (cells[a].value(), cells[b].value()) {
            (Some(x), Some(y)) => match order {
                SortOrder::Ascending => x.total_cmp(&y),
                SortOrder::Descending => y.total_cmp(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(View {
            dataset: self.dataset,
            rows,
        })
    }

    fn column_cells(&self, column: &str) -> Result<&'a [CanonicalCell], QueryError> {
        self.dataset
            .numeric()
            .column(column)
            .map(|c| c.cells.as_slice())
            .ok_or_else(|| QueryError::UnknownColumn(column.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{filter, fixtures, RowFilter};

    #[test]
    fn test_sum_ignores_non_numbers() {
        let sum = ColumnSum::from_cells([
            CanonicalCell::Number(100.0),
            CanonicalCell::Missing,
            CanonicalCell::Number(50.0),
            CanonicalCell::Unparseable,
        ]);
        assert_eq!(sum.total, 150.0);
        assert_eq!(sum.counted, 2);
        assert_eq!(sum.missing, 1);
        assert_eq!(sum.unparseable, 1);
        assert_eq!(sum.skipped(), 2);
        assert_eq!(sum.as_cell(), CanonicalCell::Number(150.0));
    }

    #[test]
    fn test_view_sum() {
        let ds = fixtures::dataset();
        let view = View::all(&ds);
        let sum = view.sum("TOTAL A SER APORTADO").unwrap();
        assert_eq!(sum.total, 450.0);
        assert_eq!(sum.missing, 1);
        assert_eq!(sum.unparseable, 1);

        let adimplentes = filter::apply(&ds, &RowFilter::from_choices("Todos", "ADIMPLENTE", "Todos"))
            .into_view()
            .unwrap();
        assert_eq!(adimplentes.sum("TOTAL A SER APORTADO").unwrap().total, 150.0);
    }

    #[test]
    fn test_sum_unknown_column() {
        let ds = fixtures::dataset();
        assert_eq!(
            View::all(&ds).sum("STATUS"),
            Err(QueryError::UnknownColumn("STATUS".to_string()))
        );
    }

    #[test]
    fn test_sorted_by_descending_keeps_rows_aligned() {
        let ds = fixtures::dataset();
        let sorted = View::all(&ds)
            .sorted_by("TOTAL A SER APORTADO", SortOrder::Descending)
            .unwrap();
        assert_eq!(sorted.rows(), &[4, 0, 2, 1, 3]);
        assert_eq!(sorted.entity(0), "Jaboatão");
        assert_eq!(
            sorted.numeric_cell(0, "TOTAL A SER APORTADO").unwrap(),
            CanonicalCell::Number(300.0)
        );
        assert_eq!(sorted.raw_cell(0, "VALOR APORTADO").unwrap().text(), "0,00");
    }

    #[test]
    fn test_sorted_by_ascending() {
        let ds = fixtures::dataset();
        let sorted = View::all(&ds)
            .sorted_by("TOTAL A SER APORTADO", SortOrder::Ascending)
            .unwrap();
        assert_eq!(sorted.rows(), &[2, 0, 4, 1, 3]);
    }
}
