use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::application::use_cases::batch_orchestrator::{build_envelope, reconcile_response};
use crate::application::use_cases::batch_validator::BatchValidator;
use crate::application::use_cases::single_result::render_single;
use crate::domain::error::{AppError, Result};
use crate::domain::model_type::ModelType;
use crate::domain::record::RawRecord;
use crate::domain::report::SingleReport;
use crate::domain::validation::ValidationError;
use crate::infrastructure::scoring_api::{HttpMethod, ScoringApi};

/// The rendered card together with the API answer it was drawn from.
#[derive(Debug, Clone, Serialize)]
pub struct SingleScore {
    pub report: SingleReport,
    pub response: Value,
}

/// Scores what one interactive form submits: a single customer, or a list
/// of accounts for collections.
pub struct SingleScoreUseCase {
    api: Arc<dyn ScoringApi + Send + Sync>,
}

impl SingleScoreUseCase {
    pub fn new(api: Arc<dyn ScoringApi + Send + Sync>) -> Self {
        Self { api }
    }

    pub async fn execute(&self, model: ModelType, form: &Value) -> Result<SingleScore> {
        let spec = model.spec();
        let validator = BatchValidator::new(model);

        let entries: Vec<&Value> = match form {
            Value::Array(items) if model == ModelType::Collections => items.iter().collect(),
            Value::Array(_) => {
                return Err(AppError::ValidationError(format!(
                    "Mô hình {} chỉ nhận một khách hàng mỗi lần",
                    model
                )))
            }
            other => vec![other],
        };
        if entries.is_empty() {
            return Err(AppError::ValidationError(
                "Vui lòng thêm ít nhất một tài khoản để phân tích".to_string(),
            ));
        }

        let records = if let [single] = entries.as_slice() {
            vec![validator.validate_form(&RawRecord::try_from(*single)?)?]
        } else {
            let mut records = Vec::with_capacity(entries.len());
            let mut errors = Vec::new();
            for (idx, entry) in entries.iter().enumerate() {
                match RawRecord::try_from(*entry).and_then(|raw| validator.validate_form(&raw)) {
                    Ok(record) => records.push(record),
                    Err(err) => errors.push(ValidationError::new(idx + 1, err.to_string())),
                }
            }
            if !errors.is_empty() {
                return Err(AppError::Validation(errors));
            }
            records
        };

        let payload = build_envelope(spec.single_envelope, &records)?;
        info!(
            model = %model,
            endpoint = spec.single_endpoint,
            records = records.len(),
            "Scoring form"
        );

        let body = self
            .api
            .call(spec.single_endpoint, HttpMethod::Post, Some(&payload))
            .await
            .map_err(|error| AppError::Api {
                context: spec.single_endpoint.to_string(),
                error,
            })?;

        let response = reconcile_response(model, body);
        let report = render_single(model, &records, &response)?;
        Ok(SingleScore { report, response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scoring_api::fake::FakeScoringApi;
    use serde_json::json;

    fn desertion_form() -> Value {
        json!({
            "customer_id": "CUS000321",
            "months_to_maturity": 3,
            "total_relationship_value": 75000,
            "number_of_products": 2,
            "satisfaction_score": 6.5,
            "number_of_complaints": 1,
            "months_since_last_interaction": 2,
            "age": 42,
            "tenure_months": 36,
            "monthly_average_balance": 8500
        })
    }

    #[tokio::test]
    async fn test_desertion_form_is_sent_as_list() {
        let api = Arc::new(FakeScoringApi::returning(json!({
            "retention_strategies": [{ "customer_id": "CUS000321", "primary_churn_reason": "Dịch vụ" }]
        })));
        let use_case = SingleScoreUseCase::new(api.clone());

        let body = use_case
            .execute(ModelType::Desertion, &desertion_form())
            .await
            .unwrap();

        assert_eq!(body.response["retention_strategies"][0]["customer_id"], "CUS000321");
        let SingleReport::Desertion(card) = body.report else {
            panic!("expected retention card");
        };
        // The low satisfaction score is read from the form.
        assert_eq!(card.action_plan.len(), 1);
        assert_eq!(card.action_plan[0], "Gọi điện khảo sát sự hài lòng và xác định vấn đề");
        let calls = api.calls();
        assert_eq!(calls[0].0, "desertion-strategy/");
        let payload = calls[0].2.as_ref().unwrap();
        assert_eq!(payload[0]["satisfaction_score"], 6.5);
    }

    #[tokio::test]
    async fn test_application_form_is_sent_as_object() {
        let api = Arc::new(FakeScoringApi::returning(json!({ "customer_id": "CUS000123" })));
        let use_case = SingleScoreUseCase::new(api.clone());
        let form = json!({
            "customer_id": "CUS000123",
            "age": 35,
            "income": 50000,
            "employment_length": 5.5,
            "debt_to_income": 0.25,
            "credit_history_length": 7,
            "number_of_debts": 2,
            "number_of_delinquent_debts": 0,
            "homeowner": 1
        });

        use_case.execute(ModelType::Application, &form).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls[0].0, "application-score/");
        assert!(calls[0].2.as_ref().unwrap().is_object());
    }

    #[tokio::test]
    async fn test_missing_form_field_is_reported() {
        let api = Arc::new(FakeScoringApi::returning(json!({})));
        let use_case = SingleScoreUseCase::new(api.clone());
        let mut form = desertion_form();
        form["age"] = Value::Null;

        let err = use_case.execute(ModelType::Desertion, &form).await.unwrap_err();
        assert_eq!(err.to_string(), "Vui lòng nhập đầy đủ thông tin (age đang thiếu)");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_collections_accounts_and_bare_response() {
        let api = Arc::new(FakeScoringApi::returning(json!([{ "customer_id": "CUS000789" }])));
        let use_case = SingleScoreUseCase::new(api.clone());
        let account = json!({
            "customer_id": "CUS000789",
            "days_past_due": 45,
            "outstanding_amount": 2500,
            "number_of_contacts": 3,
            "previous_late_payments": 2,
            "promised_payment_amount": 500,
            "broken_promises": 1,
            "months_on_book": 24,
            "last_payment_amount": 300
        });

        let body = use_case
            .execute(ModelType::Collections, &json!([account.clone(), account]))
            .await
            .unwrap();

        assert_eq!(body.response["prioritized_accounts"][0]["customer_id"], "CUS000789");
        let SingleReport::Collections(ranked) = body.report else {
            panic!("expected ranked table");
        };
        assert_eq!(ranked.table.rows[0][1].text, "CUS000789");
        assert_eq!(api.calls()[0].2.as_ref().unwrap().as_array().unwrap().len(), 2);

        let err = use_case
            .execute(ModelType::Collections, &json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
