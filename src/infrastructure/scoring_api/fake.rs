use super::{HttpMethod, ScoringApi};
use crate::domain::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// Records every call and answers with a canned response.
pub struct FakeScoringApi {
    response: Result<Value, ApiError>,
    calls: Mutex<Vec<(String, HttpMethod, Option<Value>)>>,
}

impl FakeScoringApi {
    pub fn returning(response: Value) -> Self {
        Self {
            response: Ok(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            response: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, HttpMethod, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScoringApi for FakeScoringApi {
    async fn call(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), method, payload.cloned()));
        self.response.clone()
    }
}
