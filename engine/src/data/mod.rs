pub mod csv_parser;
pub mod dataset;
pub mod encoding;
pub mod raw_table;
pub mod store;
