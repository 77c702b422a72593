// ============================================================
// BATCH ORCHESTRATOR
// ============================================================
// Drive one batch submission: input -> validation -> API -> report

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::use_cases::batch_validator::BatchValidator;
use crate::application::use_cases::result_renderer;
use crate::application::use_cases::submit_control::SubmitControls;
use crate::domain::batch_result::BatchResult;
use crate::domain::error::{AppError, Result};
use crate::domain::model_type::{Envelope, ModelType, RESULT_FIELDS};
use crate::domain::record::{NormalizedRecord, RawRecord};
use crate::domain::report::BatchReport;
use crate::infrastructure::scoring_api::{HttpMethod, ScoringApi};

/// Placeholder account data sent with manually entered collections IDs.
const COLLECTIONS_PLACEHOLDERS: [(&str, f64); 8] = [
    ("days_past_due", 30.0),
    ("outstanding_amount", 1_000_000.0),
    ("number_of_contacts", 1.0),
    ("previous_late_payments", 1.0),
    ("promised_payment_amount", 500_000.0),
    ("broken_promises", 0.0),
    ("months_on_book", 12.0),
    ("last_payment_amount", 300_000.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Idle,
    Validating,
    Submitting,
    Rendering,
    Failed,
}

impl BatchPhase {
    pub fn can_advance_to(self, next: BatchPhase) -> bool {
        use BatchPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Idle, Failed)
                | (Validating, Submitting)
                | (Validating, Failed)
                | (Submitting, Rendering)
                | (Submitting, Failed)
                | (Rendering, Failed)
                | (Rendering, Idle)
                | (Failed, Idle)
        )
    }
}

/// Tracks the phase of one submission and refuses illegal transitions.
#[derive(Debug)]
pub struct PhaseTracker {
    model: ModelType,
    batch_id: Uuid,
    phase: BatchPhase,
}

impl PhaseTracker {
    pub fn new(model: ModelType, batch_id: Uuid) -> Self {
        Self {
            model,
            batch_id,
            phase: BatchPhase::Idle,
        }
    }

    pub fn advance(&mut self, next: BatchPhase) -> Result<()> {
        if !self.phase.can_advance_to(next) {
            return Err(AppError::Internal(format!(
                "Illegal batch phase transition {:?} -> {:?}",
                self.phase, next
            )));
        }
        info!(
            model = %self.model,
            batch_id = %self.batch_id,
            from = ?self.phase,
            to = ?next,
            "Batch phase changed"
        );
        self.phase = next;
        Ok(())
    }
}

/// Where the rows of a batch come from.
#[derive(Debug, Clone)]
pub enum BatchInput {
    /// Rows read from an uploaded file.
    Rows(Vec<RawRecord>),
    /// Newline-separated customer IDs typed by the user.
    CustomerIds(String),
}

pub struct BatchOrchestrator {
    api: Arc<dyn ScoringApi + Send + Sync>,
    controls: SubmitControls,
}

impl BatchOrchestrator {
    pub fn new(api: Arc<dyn ScoringApi + Send + Sync>) -> Self {
        Self {
            api,
            controls: SubmitControls::new(),
        }
    }

    /// Run one submission to completion. A second submission for the same
    /// model is refused while this one runs.
    pub async fn submit(&self, model: ModelType, input: BatchInput) -> Result<BatchReport> {
        let _guard = self.controls.try_acquire(model)?;
        let batch_id = Uuid::new_v4();
        let mut tracker = PhaseTracker::new(model, batch_id);

        let outcome = self.run(model, batch_id, input, &mut tracker).await;
        if let Err(err) = &outcome {
            warn!(model = %model, batch_id = %batch_id, error = %err, "Batch failed");
            tracker.advance(BatchPhase::Failed)?;
        }
        tracker.advance(BatchPhase::Idle)?;
        outcome
    }

    async fn run(
        &self,
        model: ModelType,
        batch_id: Uuid,
        input: BatchInput,
        tracker: &mut PhaseTracker,
    ) -> Result<BatchReport> {
        let spec = model.spec();

        let rows = match input {
            BatchInput::Rows(rows) => rows,
            BatchInput::CustomerIds(text) => manual_rows(model, &parse_customer_ids(&text)?),
        };
        if rows.is_empty() {
            return Err(AppError::ValidationError(
                "Không có dữ liệu để xử lý".to_string(),
            ));
        }

        tracker.advance(BatchPhase::Validating)?;
        let records = BatchValidator::new(model).validate(&rows)?;

        tracker.advance(BatchPhase::Submitting)?;
        let payload = build_envelope(spec.batch_envelope, &records)?;
        info!(
            model = %model,
            batch_id = %batch_id,
            endpoint = spec.batch_endpoint,
            records = records.len(),
            "Submitting batch"
        );

        let body = self
            .api
            .call(spec.batch_endpoint, HttpMethod::Post, Some(&payload))
            .await
            .map_err(|e| {
                error!(
                    model = %model,
                    batch_id = %batch_id,
                    endpoint = spec.batch_endpoint,
                    status = ?e.status(),
                    "Batch call failed"
                );
                AppError::Api {
                    context: spec.batch_endpoint.to_string(),
                    error: e,
                }
            })?;

        tracker.advance(BatchPhase::Rendering)?;
        let body = reconcile_response(model, body);
        let values = extract_results(model, &body)?;
        let results = BatchResult::from_values(model, &values)?;
        let rendered = result_renderer::render(&results);

        info!(
            model = %model,
            batch_id = %batch_id,
            results = results.len(),
            "Batch rendered"
        );

        Ok(BatchReport {
            batch_id,
            model,
            table: rendered.table,
            statistics: rendered.statistics,
            chart: rendered.chart,
            results,
        })
    }
}

/// Split a pasted ID list into trimmed, non-blank IDs.
pub fn parse_customer_ids(text: &str) -> Result<Vec<String>> {
    let ids: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    if ids.is_empty() {
        return Err(AppError::ValidationError(
            "Vui lòng nhập danh sách ID khách hàng".to_string(),
        ));
    }
    Ok(ids)
}

/// One raw row per ID. Collections rows carry placeholder account data.
pub fn manual_rows(model: ModelType, ids: &[String]) -> Vec<RawRecord> {
    ids.iter()
        .map(|id| {
            let mut row = RawRecord::new().with("customer_id", id.as_str());
            if model == ModelType::Collections {
                for (field, value) in COLLECTIONS_PLACEHOLDERS {
                    row.insert(field, value);
                }
            }
            row
        })
        .collect()
}

/// Wrap normalized records the way the endpoint expects them.
pub fn build_envelope(envelope: Envelope, records: &[NormalizedRecord]) -> Result<Value> {
    let list = serde_json::to_value(records)
        .map_err(|e| AppError::Internal(format!("Failed to encode records: {}", e)))?;

    match envelope {
        Envelope::Customers => Ok(json!({ "customers": list })),
        Envelope::BareList => Ok(list),
        Envelope::Object => match records {
            [single] => serde_json::to_value(single)
                .map_err(|e| AppError::Internal(format!("Failed to encode record: {}", e))),
            _ => Err(AppError::Internal(format!(
                "Object envelope needs exactly one record, got {}",
                records.len()
            ))),
        },
    }
}

/// Collections answers may be a bare list; give them the usual field.
pub fn reconcile_response(model: ModelType, body: Value) -> Value {
    if model == ModelType::Collections && body.get("prioritized_accounts").is_none() {
        json!({ "prioritized_accounts": body })
    } else {
        body
    }
}

/// Find the result list in a response: the model's own field first, then
/// any of the known result fields.
pub fn extract_results(model: ModelType, body: &Value) -> Result<Vec<Value>> {
    let preferred = model.spec().response_field;
    let found = std::iter::once(preferred)
        .chain(RESULT_FIELDS)
        .find_map(|field| body.get(field).filter(|value| !value.is_null()));

    match found {
        Some(Value::Array(items)) if items.is_empty() => Err(AppError::EmptyResult(
            "Không có kết quả: không có khách hàng nào được xử lý thành công".to_string(),
        )),
        Some(Value::Array(items)) => Ok(items.clone()),
        _ => Err(AppError::MalformedResponse(body.clone())),
    }
}
