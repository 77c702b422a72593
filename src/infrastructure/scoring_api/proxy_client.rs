use super::response::{error_message, parse_success_body};
use super::{HttpMethod, ScoringApi};
use crate::domain::error::ApiError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{error, info};

/// Reaches the scoring API through the service's own proxy route, never
/// through the upstream address directly.
pub struct ProxyClient {
    client: reqwest::Client,
    proxy_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str, proxy_prefix: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            proxy_url: join_url(base_url, proxy_prefix),
        }
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        join_url(&self.proxy_url, endpoint)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait]
impl ScoringApi for ProxyClient {
    async fn call(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint_url(endpoint);
        info!(endpoint, url = %url, method = ?method, "Calling scoring API");

        let request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => {
                let request = self.client.post(&url);
                match payload {
                    Some(body) => request.body(body.to_string()),
                    None => request,
                }
            }
        };

        let response = request
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!(endpoint, error = %e, "Scoring API unreachable");
                ApiError::Transport(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &text);
            error!(endpoint, status = status.as_u16(), message = %message, "Scoring API error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(parse_success_body(&text))
    }
}
