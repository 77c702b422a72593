// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Batch upload parsing, encoding detection, and result export

mod csv_export;
mod csv_parser;

pub use csv_export::{export_file_name, write_csv};
pub use csv_parser::CsvParser;
