use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, post, web, HttpResponse};
use chrono::Local;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{parse_model, HttpState};
use crate::application::use_cases::batch_export::export_results;
use crate::application::use_cases::csv_templates::{file_template, manual_template, Template};
use crate::application::BatchInput;
use crate::domain::batch_result::BatchResult;
use crate::domain::error::AppError;
use crate::infrastructure::csv::CsvParser;

#[derive(Deserialize)]
pub struct FileQuery {
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_has_header() -> bool {
    true
}

#[derive(Deserialize)]
pub struct ManualRequest {
    pub customer_ids: String,
}

fn attachment(template: Template, content_type: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(template.file_name)],
        })
        .body(template.content)
}

#[post("/batch/{model}/file")]
async fn batch_file(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<FileQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let model = parse_model(&path)?;
    info!(model = %model, bytes = body.len(), has_header = query.has_header, "Batch file received");

    let rows = CsvParser::new()
        .with_header(query.has_header)
        .parse_bytes(&body, model.spec().fields)?;

    let report = data
        .orchestrator
        .submit(model, BatchInput::Rows(rows))
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[post("/batch/{model}/manual")]
async fn batch_manual(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    req: web::Json<ManualRequest>,
) -> Result<HttpResponse, AppError> {
    let model = parse_model(&path)?;
    let report = data
        .orchestrator
        .submit(model, BatchInput::CustomerIds(req.into_inner().customer_ids))
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[post("/batch/{model}/export")]
async fn batch_export(
    path: web::Path<String>,
    req: web::Json<Vec<Value>>,
) -> Result<HttpResponse, AppError> {
    let model = parse_model(&path)?;
    let results = BatchResult::from_values(model, &req)?;
    let export = export_results(&results, Local::now().date_naive())?;
    Ok(attachment(export, "text/csv; charset=utf-8"))
}

#[get("/batch/{model}/template")]
async fn batch_template(path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let model = parse_model(&path)?;
    Ok(attachment(file_template(model), "text/csv; charset=utf-8"))
}

#[get("/batch/{model}/manual-template")]
async fn batch_manual_template(path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let model = parse_model(&path)?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(manual_template(model).content))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(batch_file)
        .service(batch_manual)
        .service(batch_export)
        .service(batch_template)
        .service(batch_manual_template);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ApiError;
    use crate::infrastructure::scoring_api::fake::FakeScoringApi;
    use crate::interfaces::http::configure as configure_routes;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use actix_web::App;
    use serde_json::json;
    use std::sync::Arc;

    const APPLICATION_CSV: &str = "customer_id,age,income,employment_length,debt_to_income,credit_history_length,number_of_debts,number_of_delinquent_debts,homeowner\n";

    fn state(api: &Arc<FakeScoringApi>) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(api.clone(), "http://127.0.0.1:9"))
    }

    #[actix_web::test]
    async fn test_file_upload_renders_report() {
        let api = Arc::new(FakeScoringApi::returning(json!({
            "results": [{
                "customer_id": "CUS000123",
                "risk_profile": { "credit_score": 710, "risk_level": "Low", "suggested_action": "Approve" }
            }]
        })));
        let app = actix_test::init_service(App::new().app_data(state(&api)).configure(configure_routes)).await;

        let csv = format!("{}CUS000123,35,50000,5.5,0.25,7,2,0,1\n", APPLICATION_CSV);
        let req = actix_test::TestRequest::post()
            .uri("/api/batch/application/file")
            .set_payload(csv)
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["model"], "application");
        assert_eq!(body["table"]["rows"][0][3]["tone"], "success");
        assert_eq!(body["results"]["records"][0]["customer_id"], "CUS000123");
        assert_eq!(api.calls()[0].0, "batch/application-score/");
    }

    #[actix_web::test]
    async fn test_underage_upload_is_blocked() {
        let api = Arc::new(FakeScoringApi::returning(json!({ "results": [] })));
        let app = actix_test::init_service(App::new().app_data(state(&api)).configure(configure_routes)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/batch/application/file")
            .set_payload(format!("{}CUS1,17,50000,5.5,0.25,7,2,0,1\n", APPLICATION_CSV))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(
            body["messages"][0],
            "Dòng 1: Tuổi khách hàng CUS1 phải lớn hơn hoặc bằng 18 (hiện tại: 17)"
        );
        assert!(api.calls().is_empty());
    }

    #[actix_web::test]
    async fn test_headerless_upload_maps_columns_by_position() {
        let api = Arc::new(FakeScoringApi::returning(json!({ "results": [{ "customer_id": "CUS9" }] })));
        let app = actix_test::init_service(App::new().app_data(state(&api)).configure(configure_routes)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/batch/application/file?has_header=false")
            .set_payload("CUS9,40,1,1,0.1,1,0,0,0\n")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let payload = api.calls()[0].2.clone().unwrap();
        assert_eq!(payload["customers"][0]["customer_id"], "CUS9");
        assert_eq!(payload["customers"][0]["age"], 40.0);
    }

    #[actix_web::test]
    async fn test_manual_entry_and_api_failure() {
        let api = Arc::new(FakeScoringApi::failing(ApiError::Status {
            status: 500,
            message: "Error processing request: boom".to_string(),
        }));
        let app = actix_test::init_service(App::new().app_data(state(&api)).configure(configure_routes)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/batch/behavior/manual")
            .set_json(json!({ "customer_ids": "CUS000456\nCUS000457" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "api");
        assert_eq!(
            body["message"],
            "Lỗi khi gọi API batch/behavior-score/: Error processing request: boom"
        );
    }

    #[actix_web::test]
    async fn test_export_and_templates() {
        let api = Arc::new(FakeScoringApi::returning(json!({})));
        let app = actix_test::init_service(App::new().app_data(state(&api)).configure(configure_routes)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/batch/desertion/export")
            .set_json(json!([{ "customer_id": "CUS000321", "desertion_probability": 0.42, "retention_cost": 150000 }]))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let disposition = resp
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("batch_results_desertion_"));
        let csv = actix_test::read_body(resp).await;
        assert_eq!(
            std::str::from_utf8(&csv).unwrap(),
            "customer_id,desertion_probability,risk_level,primary_reason,retention_strategy,retention_cost\nCUS000321,0.42,,,,150000\n"
        );

        let req = actix_test::TestRequest::post()
            .uri("/api/batch/desertion/export")
            .set_json(json!([]))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = actix_test::TestRequest::get()
            .uri("/api/batch/collections/template")
            .to_request();
        let csv = actix_test::call_and_read_body(&app, req).await;
        assert!(std::str::from_utf8(&csv)
            .unwrap()
            .starts_with("customer_id,days_past_due,outstanding_amount"));

        let req = actix_test::TestRequest::get()
            .uri("/api/batch/behavior/manual-template")
            .to_request();
        let ids = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(&ids[..], b"CUS000456\nCUS000457\nCUS000458\nCUS000459\nCUS000460");
    }

    #[actix_web::test]
    async fn test_unknown_model_is_not_found() {
        let api = Arc::new(FakeScoringApi::returning(json!({})));
        let app = actix_test::init_service(App::new().app_data(state(&api)).configure(configure_routes)).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/batch/mortgage/template")
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
