pub mod batch;
pub mod error;
pub mod proxy;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};
use tracing::info;

use crate::application::use_cases::dashboard::sample_charts;
use crate::application::{BatchOrchestrator, SingleScoreUseCase};
use crate::domain::error::AppError;
use crate::domain::model_type::ModelType;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::scoring_api::ScoringApi;

use self::proxy::UpstreamProxy;

const PAYLOAD_LIMIT: usize = 10 * 1024 * 1024;

pub struct HttpState {
    pub orchestrator: BatchOrchestrator,
    pub single_score: SingleScoreUseCase,
    pub upstream: UpstreamProxy,
}

impl HttpState {
    pub fn new(api: Arc<dyn ScoringApi + Send + Sync>, upstream_base_url: &str) -> Self {
        Self {
            orchestrator: BatchOrchestrator::new(api.clone()),
            single_score: SingleScoreUseCase::new(api),
            upstream: UpstreamProxy::new(upstream_base_url),
        }
    }
}

/// Path segments name models in lowercase; anything else is a missing route.
pub(crate) fn parse_model(name: &str) -> Result<ModelType, AppError> {
    name.parse::<ModelType>()
        .map_err(|_| AppError::NotFound(format!("Unknown model: {}", name)))
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[post("/score/{model}")]
async fn score(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    req: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let model = parse_model(&path)?;
    let body = data.single_score.execute(model, &req).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[get("/dashboard/charts")]
async fn dashboard_charts() -> HttpResponse {
    HttpResponse::Ok().json(sample_charts())
}

/// Registers every route; the caller supplies `web::Data<HttpState>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(PAYLOAD_LIMIT))
        .app_data(web::JsonConfig::default().limit(PAYLOAD_LIMIT))
        .service(health)
        .service(
            web::scope("/api")
                .configure(proxy::configure)
                .configure(batch::configure)
                .service(score)
                .service(dashboard_charts),
        );
}

pub fn start_server(config: &AppConfig, state: HttpState) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let host = config.server.host.clone();
    let port = config.server.port;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run();

    info!(host = %host, port, "HTTP server listening");
    Ok(server)
}
