use actix_web::http::{Method, StatusCode};
use actix_web::{route, web, HttpRequest, HttpResponse};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use url::Url;

use super::HttpState;

static ENDPOINT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-/]+$").expect("valid endpoint pattern"));

/// Forwards proxy requests to the upstream scoring API.
pub struct UpstreamProxy {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamProxy {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn target_url(&self, endpoint: &str, query: &str) -> String {
        let mut url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

pub fn is_valid_endpoint(endpoint: &str) -> bool {
    ENDPOINT_PATTERN.is_match(endpoint) && !endpoint.contains("..")
}

fn detail(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "detail": message }))
}

#[route("/proxy/{endpoint:.*}", method = "GET", method = "POST")]
async fn proxy_api(
    data: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let endpoint = path.into_inner();
    if !is_valid_endpoint(&endpoint) {
        warn!(endpoint = %endpoint, "Rejected proxy endpoint");
        return detail(
            StatusCode::BAD_REQUEST,
            format!("Invalid endpoint: {}", endpoint),
        );
    }

    let proxy = &data.upstream;
    let is_post = *req.method() == Method::POST;
    let url = if is_post {
        proxy.target_url(&endpoint, "")
    } else {
        proxy.target_url(&endpoint, req.query_string())
    };
    if let Err(e) = Url::parse(&url) {
        warn!(url = %url, error = %e, "Rejected proxy target");
        return detail(StatusCode::BAD_REQUEST, format!("Invalid target URL: {}", e));
    }
    info!(endpoint = %endpoint, url = %url, method = %req.method(), "Proxying request");

    let request = if is_post {
        let request = proxy.client.post(&url).header(CONTENT_TYPE, "application/json");
        if body.is_empty() {
            request
        } else {
            request.body(body.to_vec())
        }
    } else {
        proxy.client.get(&url)
    };

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            error!(endpoint = %endpoint, error = %e, "Upstream unreachable");
            return detail(
                StatusCode::BAD_GATEWAY,
                format!("Không thể kết nối tới API: {}", e),
            );
        }
    };

    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            error!(endpoint = %endpoint, error = %e, "Failed to read upstream response");
            return detail(
                StatusCode::BAD_GATEWAY,
                format!("Failed to read response: {}", e),
            );
        }
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => {
            info!(endpoint = %endpoint, status = status.as_u16(), "Upstream responded");
            HttpResponse::build(status).json(value)
        }
        Err(_) => {
            error!(
                endpoint = %endpoint,
                status = status.as_u16(),
                "Upstream returned a non-JSON body"
            );
            detail(
                StatusCode::BAD_GATEWAY,
                format!("Upstream returned a non-JSON response (HTTP {})", status.as_u16()),
            )
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(proxy_api);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scoring_api::{HttpMethod, ProxyClient, ScoringApi};
    use actix_web::test as actix_test;
    use actix_web::{App, HttpServer};
    use std::net::SocketAddr;
    use std::sync::Arc;

    /// Serves a stand-in scoring API on an ephemeral port.
    fn spawn_upstream() -> SocketAddr {
        let server = HttpServer::new(|| {
            App::new()
                .route(
                    "/application-score/",
                    web::post().to(|body: web::Json<Value>| async move {
                        if body["age"].as_f64().unwrap_or(0.0) < 18.0 {
                            HttpResponse::UnprocessableEntity().json(json!({
                                "detail": [{ "loc": ["body", "age"], "msg": "must be >= 18" }]
                            }))
                        } else {
                            HttpResponse::Ok().json(json!({ "customer_id": body["customer_id"] }))
                        }
                    }),
                )
                .route(
                    "/models",
                    web::get().to(|req: HttpRequest| async move {
                        HttpResponse::Ok().json(json!({ "query": req.query_string() }))
                    }),
                )
                .route(
                    "/plain",
                    web::get().to(|| async { HttpResponse::Ok().body("not json") }),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        addr
    }

    fn state_for(upstream: &str) -> web::Data<HttpState> {
        // The API client is not used by proxy routes.
        let api = Arc::new(ProxyClient::new("http://127.0.0.1:9", "/api/proxy"));
        web::Data::new(HttpState::new(api, upstream))
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(is_valid_endpoint("batch/application-score/"));
        assert!(is_valid_endpoint("collections-prioritize/"));
        assert!(!is_valid_endpoint("../etc/passwd"));
        assert!(!is_valid_endpoint("a/../b"));
        assert!(!is_valid_endpoint("score?x=1"));
        assert!(!is_valid_endpoint(""));
    }

    #[actix_web::test]
    async fn test_proxy_relays_status_and_json() {
        let upstream = spawn_upstream();
        let app = actix_test::init_service(
            App::new()
                .app_data(state_for(&format!("http://{}", upstream)))
                .service(web::scope("/api").configure(configure)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/proxy/application-score/")
            .set_json(json!({ "customer_id": "CUS1", "age": 17 }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["detail"][0]["msg"], "must be >= 18");

        let req = actix_test::TestRequest::get()
            .uri("/api/proxy/models?page=2")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["query"], "page=2");

        let req = actix_test::TestRequest::get().uri("/api/proxy/plain").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state_for("http://127.0.0.1:9"))
                .service(web::scope("/api").configure(configure)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/proxy/application-score/")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = actix_test::read_body_json(resp).await;
        assert!(body["detail"].as_str().unwrap().starts_with("Không thể kết nối tới API"));
    }

    #[actix_web::test]
    async fn test_api_client_through_running_proxy() {
        let upstream = spawn_upstream();
        let state = state_for(&format!("http://{}", upstream));

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .service(web::scope("/api").configure(configure))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let gateway = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        let client = ProxyClient::new(&format!("http://{}", gateway), "/api/proxy");

        let ok = client
            .call(
                "application-score/",
                HttpMethod::Post,
                Some(&json!({ "customer_id": "CUS1", "age": 30 })),
            )
            .await
            .unwrap();
        assert_eq!(ok["customer_id"], "CUS1");

        let err = client
            .call(
                "application-score/",
                HttpMethod::Post,
                Some(&json!({ "customer_id": "CUS1", "age": 17 })),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "Lỗi dữ liệu: body.age - must be >= 18");
    }
}
