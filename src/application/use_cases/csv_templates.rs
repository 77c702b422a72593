// ============================================================
// CSV TEMPLATES
// ============================================================
// Downloadable upload templates and manual-entry sample ID lists

use serde::Serialize;

use crate::domain::model_type::ModelType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub file_name: String,
    pub content: String,
}

/// Schema header followed by the model's example rows.
pub fn file_template(model: ModelType) -> Template {
    let spec = model.spec();
    let mut content = spec.csv_header();
    content.push('\n');
    for row in spec.template_rows {
        content.push_str(row);
        content.push('\n');
    }

    Template {
        file_name: spec.template_file_name(),
        content,
    }
}

/// Sample customer IDs for the manual entry box, one per line.
pub fn manual_template(model: ModelType) -> Template {
    let spec = model.spec();
    Template {
        file_name: format!("{}_ids.txt", spec.key),
        content: spec.sample_ids.join("\n"),
    }
}
