// ============================================================
// RECORD TYPES
// ============================================================
// Loosely-typed input rows and their normalized, schema-shaped form

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;

use super::error::AppError;

/// A value as it arrived from a CSV cell, a form or a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
}

impl RawValue {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawValue::Text(text) => Cow::Borrowed(text.as_str()),
            RawValue::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    /// Whether the value carries nothing (an empty CSV cell or form input).
    pub fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(text) if text.trim().is_empty())
    }

    /// Read the value as a number. Blank or unparseable text yields `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// One input row: ordered key/value pairs with arbitrary keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    entries: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace the value stored under exactly `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Exact key match first, then a case-insensitive match.
    pub fn lookup(&self, field: &str) -> Option<&RawValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == field)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(k, _)| k.to_lowercase() == field.to_lowercase())
            })
            .map(|(_, v)| v)
    }

    /// Like [`lookup`](Self::lookup) but treats blank values as absent.
    pub fn lookup_present(&self, field: &str) -> Option<&RawValue> {
        self.lookup(field).filter(|value| !value.is_blank())
    }
}

impl TryFrom<&Value> for RawRecord {
    type Error = AppError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let object = value.as_object().ok_or_else(|| {
            AppError::ValidationError("Expected a JSON object for each record".to_string())
        })?;

        let mut record = RawRecord::new();
        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::String(text) => record.insert(key.clone(), text.clone()),
                Value::Number(n) => {
                    if let Some(n) = n.as_f64() {
                        record.insert(key.clone(), n);
                    }
                }
                Value::Bool(b) => record.insert(key.clone(), if *b { 1.0 } else { 0.0 }),
                other => record.insert(key.clone(), other.to_string()),
            }
        }
        Ok(record)
    }
}

/// A typed value in a normalized record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Number(_) => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(text) => serializer.serialize_str(text),
            // Non-finite numbers have no JSON form; send null like the browser did.
            FieldValue::Number(n) if !n.is_finite() => serializer.serialize_none(),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

/// A record shaped to one model's schema: every field present, in schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRecord {
    fields: Vec<(&'static str, FieldValue)>,
}

impl NormalizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &'static str, value: FieldValue) {
        match self.fields.iter_mut().find(|(k, _)| *k == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| *k == field).map(|(_, v)| v)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    pub fn customer_id(&self) -> &str {
        self.get(super::model_type::ID_FIELD)
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&'static str, &mut FieldValue)> {
        self.fields.iter_mut().map(|(k, v)| (*k, v))
    }
}

impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Print a number the way a user typed it: integral values without a
/// fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_prefers_exact_key() {
        let record = RawRecord::new()
            .with("AGE", "40")
            .with("age", "30");

        assert_eq!(record.lookup("age"), Some(&RawValue::Text("30".to_string())));
        assert_eq!(record.lookup("Age"), Some(&RawValue::Text("40".to_string())));
        assert_eq!(record.lookup("income"), None);
    }

    #[test]
    fn test_blank_text_is_not_a_number() {
        assert_eq!(RawValue::from("  ").to_number(), None);
        assert_eq!(RawValue::from("abc").to_number(), None);
        assert_eq!(RawValue::from(" 2.5 ").to_number(), Some(2.5));
        assert_eq!(RawValue::from(0.0).to_number(), Some(0.0));
    }

    #[test]
    fn test_record_from_json_object() {
        let record = RawRecord::try_from(&json!({
            "customer_id": "CUS1",
            "age": 35,
            "homeowner": true,
            "note": null
        }))
        .unwrap();

        assert!(record.lookup("note").is_none());
        assert_eq!(record.lookup("age").and_then(RawValue::to_number), Some(35.0));
        assert_eq!(record.lookup("homeowner").and_then(RawValue::to_number), Some(1.0));
        assert!(RawRecord::try_from(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_normalized_record_serializes_in_schema_order() {
        let mut record = NormalizedRecord::new();
        record.set("customer_id", FieldValue::Text("CUS1".to_string()));
        record.set("age", FieldValue::Number(35.0));
        record.set("income", FieldValue::Number(f64::NAN));

        let encoded = serde_json::to_string(&record).unwrap();
        assert_eq!(encoded, r#"{"customer_id":"CUS1","age":35.0,"income":null}"#);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(17.0), "17");
        assert_eq!(format_number(17.5), "17.5");
        assert_eq!(format_number(-3.0), "-3");
    }
}
