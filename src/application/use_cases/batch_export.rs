use chrono::NaiveDate;
use tracing::info;

use crate::application::use_cases::csv_templates::Template;
use crate::application::use_cases::result_renderer::export_rows;
use crate::domain::batch_result::BatchResult;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::{export_file_name, write_csv};

/// CSV download of a batch result handed back by the caller.
pub fn export_results(results: &BatchResult, date: NaiveDate) -> Result<Template> {
    if results.is_empty() {
        return Err(AppError::ValidationError(
            "Không có dữ liệu để xuất".to_string(),
        ));
    }

    let (headers, rows) = export_rows(results);
    let bytes = write_csv(&headers, &rows)?;
    let content = String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("Export is not valid UTF-8: {}", e)))?;

    info!(model = %results.model(), rows = rows.len(), "Exported batch results");
    Ok(Template {
        file_name: export_file_name(results.model(), date),
        content,
    })
}
