// ============================================================
// BATCH RESULT TYPES
// ============================================================
// Per-record outcomes returned by the scoring API, one shape per model.
// Numbers are read leniently: JSON numbers, numeric strings, or absent.
// Non-finite values ("NaN", "inf") count as absent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::{AppError, Result};
use super::model_type::ModelType;

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });
    Ok(number.filter(|n| n.is_finite()))
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }))
}

/// A list of labels; anything other than an array counts as absent.
fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    }))
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    #[serde(default, deserialize_with = "lenient_number")]
    pub credit_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub default_probability: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub risk_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub suggested_action: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub top_risk_factors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_profile: RiskProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditRecommendation {
    #[serde(default, deserialize_with = "lenient_number")]
    pub credit_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_limit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub suggested_limit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub suggested_action: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub risk_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub default_probability: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub top_risk_factors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub credit_recommendation: CreditRecommendation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionsResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub priority_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub collection_strategy: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub outstanding_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub expected_recovery_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub recovery_roi: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub recommended_channel: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesertionResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub desertion_probability: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub risk_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub primary_churn_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub retention_strategy: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub retention_cost: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub retention_roi: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub action_plan: Option<String>,
}

/// Ordered per-record outcomes of one batch, typed by model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", content = "records", rename_all = "lowercase")]
pub enum BatchResult {
    Application(Vec<ApplicationResult>),
    Behavior(Vec<BehaviorResult>),
    Collections(Vec<CollectionsResult>),
    Desertion(Vec<DesertionResult>),
}

fn parse_records<T: for<'de> Deserialize<'de>>(records: &[Value]) -> Result<Vec<T>> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            if !record.is_object() {
                return Err(AppError::ParseError(format!(
                    "Result #{} is not a JSON object",
                    idx + 1
                )));
            }
            serde_json::from_value(record.clone()).map_err(|e| {
                AppError::ParseError(format!("Result #{} has an unexpected shape: {}", idx + 1, e))
            })
        })
        .collect()
}

impl BatchResult {
    /// Type a raw list of result objects for `model`.
    pub fn from_values(model: ModelType, records: &[Value]) -> Result<Self> {
        Ok(match model {
            ModelType::Application => BatchResult::Application(parse_records(records)?),
            ModelType::Behavior => BatchResult::Behavior(parse_records(records)?),
            ModelType::Collections => BatchResult::Collections(parse_records(records)?),
            ModelType::Desertion => BatchResult::Desertion(parse_records(records)?),
        })
    }

    pub fn model(&self) -> ModelType {
        match self {
            BatchResult::Application(_) => ModelType::Application,
            BatchResult::Behavior(_) => ModelType::Behavior,
            BatchResult::Collections(_) => ModelType::Collections,
            BatchResult::Desertion(_) => ModelType::Desertion,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BatchResult::Application(r) => r.len(),
            BatchResult::Behavior(r) => r.len(),
            BatchResult::Collections(r) => r.len(),
            BatchResult::Desertion(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_numbers_and_ids() {
        let records = vec![json!({
            "customer_id": 42,
            "priority_score": "87.5",
            "collection_strategy": "Cure",
            "outstanding_amount": null
        })];

        let result = BatchResult::from_values(ModelType::Collections, &records).unwrap();
        let BatchResult::Collections(rows) = result else {
            panic!("expected collections result");
        };

        assert_eq!(rows[0].customer_id.as_deref(), Some("42"));
        assert_eq!(rows[0].priority_score, Some(87.5));
        assert_eq!(rows[0].outstanding_amount, None);
        assert_eq!(rows[0].expected_recovery_value, None);
    }

    #[test]
    fn test_non_finite_strings_are_absent() {
        let records = vec![json!({
            "customer_id": "CUS2",
            "desertion_probability": "NaN",
            "retention_cost": "inf"
        })];
        let result = BatchResult::from_values(ModelType::Desertion, &records).unwrap();
        let BatchResult::Desertion(rows) = result else {
            panic!("expected desertion result");
        };

        assert_eq!(rows[0].desertion_probability, None);
        assert_eq!(rows[0].retention_cost, None);
    }

    #[test]
    fn test_risk_factors_must_be_a_list() {
        let records = vec![
            json!({ "risk_profile": { "top_risk_factors": ["Tuổi thấp", null, 3] } }),
            json!({ "risk_profile": { "top_risk_factors": "Tuổi thấp" } }),
        ];
        let result = BatchResult::from_values(ModelType::Application, &records).unwrap();
        let BatchResult::Application(rows) = result else {
            panic!("expected application result");
        };

        assert_eq!(
            rows[0].risk_profile.top_risk_factors,
            Some(vec!["Tuổi thấp".to_string(), "3".to_string()])
        );
        assert_eq!(rows[1].risk_profile.top_risk_factors, None);
    }

    #[test]
    fn test_missing_nested_profile_defaults() {
        let records = vec![json!({ "customer_id": "CUS1" })];
        let result = BatchResult::from_values(ModelType::Application, &records).unwrap();

        assert_eq!(
            result,
            BatchResult::Application(vec![ApplicationResult {
                customer_id: Some("CUS1".to_string()),
                risk_profile: RiskProfile::default(),
            }])
        );
    }

    #[test]
    fn test_non_object_result_is_rejected() {
        let records = vec![json!("CUS1")];
        assert!(BatchResult::from_values(ModelType::Desertion, &records).is_err());
    }

    #[test]
    fn test_tagged_serialization() {
        let result = BatchResult::Desertion(vec![DesertionResult {
            customer_id: Some("CUS9".to_string()),
            ..Default::default()
        }]);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["model"], "desertion");
        assert_eq!(value["records"][0]["customer_id"], "CUS9");

        let back: BatchResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.len(), 1);
    }
}
