// Engine library root: loads the debtor spreadsheet, normalises it and
// serves filtered, formatted views to a presentation surface.

pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod normalize;
pub mod panel;
pub mod query;

pub use config::DashboardSchema;
pub use data::dataset::Dataset;
pub use data::store::DatasetStore;
pub use error::{EngineError, LoadError, QueryError};

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use painel_shared::models::{CanonicalCell, Notation};
    use tempfile::NamedTempFile;

    use super::*;
    use crate::format::format_cell;
    use crate::panel::{build_panel, Panel, PanelOptions};
    use crate::query::RowFilter;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_two_entities_and_totals_row_sum_to_four_thousand() {
        let csv_content = "\
ENTE;STATUS;TOTAL A SER APORTADO;VALOR APORTADO;DÍVIDA EM MORA / RCL
Recife;ADIMPLENTE;1.500,00;500,00;0,066
Olinda;INADIMPLENTE;2.500,00;#N/D;12,5%
TOTAL;;4.000,00;500,00;";
        let tmp_file = create_test_csv(csv_content);
        let schema = Arc::new(DashboardSchema::load_default().unwrap());
        let dataset = Dataset::load(tmp_file.path(), schema.clone()).unwrap();
        assert_eq!(dataset.len(), 2);

        let filter = RowFilter::from_choices("Todos", "Todos", &schema.all_label);
        let result = dataset.filter(&filter);
        assert_eq!(result.len(), 2);

        let sum = result.view().unwrap().sum("TOTAL A SER APORTADO").unwrap();
        assert_eq!(sum.total, 4000.0);
        assert_eq!(format_cell(sum.as_cell(), Notation::Currency), "R$ 4.000,00");

        let ratio = dataset.numeric().cell(0, "DÍVIDA EM MORA / RCL").unwrap();
        assert!((ratio.value().unwrap() - 6.6).abs() < 1e-9);
        assert_eq!(format_cell(ratio, Notation::Percent), "6,60%");
        assert_eq!(
            dataset.numeric().cell(1, "DÍVIDA EM MORA / RCL"),
            Some(CanonicalCell::Number(12.5))
        );
    }

    #[test]
    fn test_totals_row_before_empty_trailer_is_not_summed() {
        let csv_content = "\
ENTE;STATUS;TOTAL A SER APORTADO;VALOR APORTADO;DÍVIDA EM MORA / RCL
Recife;ADIMPLENTE;1.500,00;500,00;0,066
Olinda;INADIMPLENTE;2.500,00;#N/D;12,5%
TOTAL;;4.000,00;500,00;
;;;;";
        let tmp_file = create_test_csv(csv_content);
        let schema = Arc::new(DashboardSchema::load_default().unwrap());
        let dataset = Dataset::load(tmp_file.path(), schema).unwrap();

        assert_eq!(dataset.entities(), vec!["Olinda", "Recife"]);
        let result = dataset.filter(&RowFilter::all());
        let sum = result.view().unwrap().sum("TOTAL A SER APORTADO").unwrap();
        assert_eq!(sum.total, 4000.0);
        assert_eq!(format_cell(sum.as_cell(), Notation::Currency), "R$ 4.000,00");
    }

    #[test]
    fn test_panel_from_file() {
        let csv_content = "\
\u{FEFF}ENTE;STATUS;TOTAL A SER APORTADO;VALOR APORTADO;SALDO REMANESCENTE A APORTAR;DÍVIDA EM MORA / RCL;TJPE;TRF5;TRT6;TJPE (%);TRF5 (%);TRT6 (%)
Recife;ADIMPLENTE;1.000,00;400,00;600,00;0,1;800,00;100,00;100,00;0,8;0,1;0,1
Olinda;INADIMPLENTE;2.000,00;-;2.000,00;25%;1.000,00;500,00;500,00;50%;25%;25%
;;3.000,00;400,00;2.600,00;;1.800,00;600,00;600,00;;;";
        let tmp_file = create_test_csv(csv_content);
        let schema = Arc::new(DashboardSchema::load_default().unwrap());
        let mut store = DatasetStore::new(schema);
        let dataset = store.get_or_load(tmp_file.path()).unwrap();

        let report = match build_panel(&dataset, &RowFilter::all(), &PanelOptions::default()).unwrap() {
            Panel::Ready(report) => report,
            Panel::Empty { .. } => panic!("expected rows"),
        };
        let values: Vec<&str> = report.kpis.iter().map(|k| k.value.as_str()).collect();
        assert_eq!(values, vec!["R$ 3.000,00", "R$ 400,00", "R$ 2.600,00", "Múltiplos"]);
        let courts: Vec<&str> = report.court_totals.iter().map(|k| k.value.as_str()).collect();
        assert_eq!(courts, vec!["R$ 1.800,00", "R$ 600,00", "R$ 600,00"]);

        let rateio = &report.tabs[2];
        assert_eq!(rateio.headers, vec!["ENTE", "TJPE (%)", "TRF5 (%)", "TRT6 (%)"]);
        assert_eq!(rateio.rows[0], vec!["Recife", "80,00%", "10,00%", "10,00%"]);
        assert_eq!(rateio.rows[1], vec!["Olinda", "50,00%", "25,00%", "25,00%"]);
    }

    #[test]
    fn test_structural_failure_yields_no_dataset() {
        let tmp_file = create_test_csv("ENTE;STATUS\nRecife;ADIMPLENTE\nTOTAL;");
        let schema = Arc::new(DashboardSchema::load_default().unwrap());
        let err = Dataset::load(tmp_file.path(), schema).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("TOTAL A SER APORTADO"));
        assert!(msg.contains("Columns found"));
    }
}
