// ============================================================
// RECORD NORMALIZER
// ============================================================
// Map a loosely-typed input row onto one model's field schema

use tracing::warn;

use crate::domain::model_type::{ModelSpec, ModelType, AGE_FIELD, ID_FIELD};
use crate::domain::record::{format_number, FieldValue, NormalizedRecord, RawRecord, RawValue};

pub const UNKNOWN_CUSTOMER_ID: &str = "UNKNOWN";
pub const MIN_AGE: f64 = 18.0;

/// A normalized record together with the validation messages found while
/// building it. Messages do not stop normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: NormalizedRecord,
    pub messages: Vec<String>,
}

impl Normalized {
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }
}

pub struct RecordNormalizer {
    spec: &'static ModelSpec,
}

impl RecordNormalizer {
    pub fn new(model: ModelType) -> Self {
        Self { spec: model.spec() }
    }

    pub fn model(&self) -> ModelType {
        self.spec.model
    }

    /// Build a record holding every schema field, in schema order.
    ///
    /// Blank or unparseable values count as missing and take the field
    /// default. Only the age rule produces messages.
    pub fn normalize(&self, raw: &RawRecord) -> Normalized {
        let mut record = NormalizedRecord::new();
        let mut missing = Vec::new();

        for &field in self.spec.fields {
            let coerced = raw
                .lookup_present(field)
                .and_then(|value| coerce(field, value));

            let value = match coerced {
                Some(value) => value,
                None => {
                    missing.push(field);
                    default_for(field)
                }
            };
            record.set(field, value);
        }

        if !missing.is_empty() {
            warn!(
                model = %self.spec.model,
                customer_id = %record.customer_id(),
                missing = ?missing,
                "Fields not found in record, using defaults"
            );
        }

        let mut messages = Vec::new();
        if let Some(age) = record.number(AGE_FIELD) {
            if age < MIN_AGE {
                messages.push(format!(
                    "Tuổi khách hàng {} phải lớn hơn hoặc bằng 18 (hiện tại: {})",
                    record.customer_id(),
                    format_number(age)
                ));
            }
        }

        Normalized { record, messages }
    }
}

fn coerce(field: &str, value: &RawValue) -> Option<FieldValue> {
    if field == ID_FIELD {
        let text = value.as_text();
        let text = text.trim();
        return (!text.is_empty()).then(|| FieldValue::Text(text.to_string()));
    }
    value.to_number().map(FieldValue::Number)
}

fn default_for(field: &str) -> FieldValue {
    match field {
        ID_FIELD => FieldValue::Text(UNKNOWN_CUSTOMER_ID.to_string()),
        AGE_FIELD => FieldValue::Number(MIN_AGE),
        _ => FieldValue::Number(0.0),
    }
}
