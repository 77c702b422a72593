use serde::{Deserialize, Serialize};
use std::fmt;

use super::validation::ValidationError;

/// Failure of a call made through the scoring proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApiError {
    /// The request never produced an HTTP response (connection refused, DNS, ...).
    Transport(String),
    /// The proxy answered with a non-2xx status. `message` is already
    /// formatted for the user.
    Status { status: u16, message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Status { status, .. } => Some(*status),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "Không thể kết nối tới API: {}", msg),
            ApiError::Status { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    /// Client-side validation failed; nothing was sent to the API.
    Validation(Vec<ValidationError>),
    /// A single request-level validation problem (bad parameter, empty input).
    ValidationError(String),
    ParseError(String),
    /// The API call failed. `context` names the endpoint that was called.
    Api { context: String, error: ApiError },
    /// The API succeeded but returned no processable records.
    EmptyResult(String),
    /// The API response did not have the expected shape.
    MalformedResponse(serde_json::Value),
    /// A submission for the same model is still in flight.
    Conflict(String),
    ConfigError(String),
    IoError(String),
}

impl AppError {
    /// Every user-facing message carried by this error, one per line of output.
    pub fn messages(&self) -> Vec<String> {
        match self {
            AppError::Validation(errors) => errors.iter().map(|e| e.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }

    /// Short machine-readable kind, used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "internal",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) | AppError::ValidationError(_) => "validation",
            AppError::ParseError(_) => "parse",
            AppError::Api { .. } => "api",
            AppError::EmptyResult(_) => "empty_result",
            AppError::MalformedResponse(_) => "malformed_response",
            AppError::Conflict(_) => "conflict",
            AppError::ConfigError(_) => "config",
            AppError::IoError(_) => "io",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Validation(errors) => {
                let joined = errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("\n");
                write!(f, "{}", joined)
            }
            AppError::ValidationError(msg) => write!(f, "{}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::Api { context, error } => {
                write!(f, "Lỗi khi gọi API {}: {}", context, error)
            }
            AppError::EmptyResult(msg) => write!(f, "{}", msg),
            AppError::MalformedResponse(_) => write!(
                f,
                "Không tìm thấy kết quả: không có dữ liệu kết quả được trả về từ API"
            ),
            AppError::Conflict(msg) => write!(f, "{}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
