// Filtered views over a loaded dataset and the aggregates computed on them.
pub mod aggregate;
pub mod filter;

pub use aggregate::{ColumnSum, SortOrder};
pub use filter::{FilterResult, RowFilter, Selection, View};

use painel_shared::utils::collation::sort_key_without_accents;

/// De-duplicates by exact value and orders by the accent/case-insensitive key,
/// falling back to the exact value so the order is total.
pub fn distinct_sorted<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let mut out: Vec<String> = values.into_iter().collect();
    out.sort_by_cached_key(|s| (sort_key_without_accents(s), s.clone()));
    out.dedup();
    out
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use painel_shared::models::RawCell;

    use crate::config::DashboardSchema;
    use crate::data::dataset::Dataset;
    use crate::data::raw_table::RawTable;

    pub fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    /// Five entities; TOTAL A SER APORTADO holds [100, Missing, 50, Unparseable, 300].
    pub fn dataset() -> Dataset {
        let schema = Arc::new(DashboardSchema::load_default().unwrap());
        let columns = [
            "ENTE",
            "STATUS",
            "TOTAL A SER APORTADO",
            "VALOR APORTADO",
            "DÍVIDA EM MORA / RCL",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        let raw = RawTable::new(
            columns,
            vec![
                vec![text("Recife"), text("ADIMPLENTE"), text("100,00"), text("10,00"), text("0,05")],
                vec![text("Olinda"), text("INADIMPLENTE"), text("#N/D"), text("20,00"), text("12%")],
                vec![text("Água Preta"), text("ADIMPLENTE"), text("50,00"), RawCell::Empty, text("-")],
                vec![text("Paulista"), RawCell::Empty, text("cem"), text("5,00"), text("1,5")],
                vec![text("Jaboatão"), text("INADIMPLENTE"), text("300,00"), text("0,00"), text("0,5")],
            ],
        )
        .unwrap();
        Dataset::from_raw(raw, schema)
    }
}
