#[cfg(test)]
pub mod fake;
pub mod proxy_client;
pub mod response;

use crate::domain::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;

pub use proxy_client::ProxyClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Calls the scoring API. Implementations decide the transport; callers only
/// deal with relative endpoints such as `batch/application-score/`.
#[async_trait]
pub trait ScoringApi {
    async fn call(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<Value, ApiError>;
}
