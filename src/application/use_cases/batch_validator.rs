// ============================================================
// BATCH VALIDATOR
// ============================================================
// Per-model structural checks run before anything is sent to the API

use tracing::warn;

use crate::application::use_cases::record_normalizer::RecordNormalizer;
use crate::domain::error::{AppError, Result};
use crate::domain::model_type::{ModelType, ID_FIELD, OUTSTANDING_FIELD};
use crate::domain::record::{FieldValue, NormalizedRecord, RawRecord};
use crate::domain::validation::ValidationError;

pub struct BatchValidator {
    normalizer: RecordNormalizer,
}

impl BatchValidator {
    pub fn new(model: ModelType) -> Self {
        Self {
            normalizer: RecordNormalizer::new(model),
        }
    }

    pub fn model(&self) -> ModelType {
        self.normalizer.model()
    }

    /// Normalize every row, collecting all problems before giving up.
    ///
    /// Returns the records only when no row produced a message. Errors carry
    /// 1-based row numbers, one entry per failing row.
    pub fn validate(&self, rows: &[RawRecord]) -> Result<Vec<NormalizedRecord>> {
        let mut records = Vec::with_capacity(rows.len());
        let mut errors = Vec::new();

        for (idx, raw) in rows.iter().enumerate() {
            let row = idx + 1;

            if self.model() == ModelType::Collections {
                if let Some(message) = precheck_collections(raw) {
                    errors.push(ValidationError::new(row, message));
                    continue;
                }
            }

            let mut normalized = self.normalizer.normalize(raw);
            if self.model() == ModelType::Collections {
                zero_non_finite(&mut normalized.record);
            }

            if !normalized.is_valid() {
                errors.push(ValidationError::from_messages(row, &normalized.messages));
            }
            records.push(normalized.record);
        }

        if errors.is_empty() {
            Ok(records)
        } else {
            warn!(
                model = %self.model(),
                rows = rows.len(),
                failed = errors.len(),
                "Batch rejected by validation"
            );
            Err(AppError::Validation(errors))
        }
    }

    /// Validate one interactive form: every schema field must be filled in.
    pub fn validate_form(&self, raw: &RawRecord) -> Result<NormalizedRecord> {
        require_all_fields(self.model(), raw).map_err(AppError::ValidationError)?;

        let mut normalized = self.normalizer.normalize(raw);
        if self.model() == ModelType::Collections {
            zero_non_finite(&mut normalized.record);
        }

        if normalized.is_valid() {
            Ok(normalized.record)
        } else {
            Err(AppError::ValidationError(normalized.messages.join(", ")))
        }
    }
}

/// Rejects a collections row that cannot be prioritized at all.
/// A zero outstanding amount is valid.
pub fn precheck_collections(raw: &RawRecord) -> Option<String> {
    let Some(id) = raw.lookup_present(ID_FIELD) else {
        return Some("Thiếu ID khách hàng".to_string());
    };

    if raw.lookup_present(OUTSTANDING_FIELD).is_none() {
        return Some(format!(
            "Thiếu số tiền nợ cho khách hàng {}",
            id.as_text().trim()
        ));
    }

    None
}

/// Replace every non-finite numeric field with 0.
pub fn zero_non_finite(record: &mut NormalizedRecord) {
    for (_, value) in record.iter_mut() {
        if let FieldValue::Number(n) = value {
            if !n.is_finite() {
                *n = 0.0;
            }
        }
    }
}

/// First schema field that is absent or blank, as a user-facing message.
pub fn require_all_fields(model: ModelType, raw: &RawRecord) -> std::result::Result<(), String> {
    match model
        .spec()
        .fields
        .iter()
        .find(|field| raw.lookup_present(field).is_none())
    {
        Some(field) => Err(format!(
            "Vui lòng nhập đầy đủ thông tin ({} đang thiếu)",
            field
        )),
        None => Ok(()),
    }
}
