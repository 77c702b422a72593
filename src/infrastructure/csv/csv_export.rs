// ============================================================
// CSV EXPORT
// ============================================================
// Write result rows as a downloadable CSV file

use chrono::NaiveDate;
use csv::Writer;

use crate::domain::error::{AppError, Result};
use crate::domain::model_type::ModelType;

/// Serialize a header line and rows. Fields are quoted only when needed.
pub fn write_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::IoError(format!("Failed to finish CSV export: {}", e)))
}

pub fn export_file_name(model: ModelType, date: NaiveDate) -> String {
    format!("batch_results_{}_{}.csv", model, date.format("%Y-%m-%d"))
}
