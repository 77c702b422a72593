use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::error::{AppError, Result};

pub const CONFIG_PATH_VAR: &str = "SCORING_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "scoring.toml";
const ENV_PREFIX: &str = "SCORING_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
}

/// The scoring API the proxy route forwards to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpstreamConfig {
    #[validate(url)]
    pub base_url: String,
}

/// Where the API client finds the proxy route. Without a `base_url` the
/// client targets this service's own `server` address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    #[serde(default)]
    #[validate(url)]
    pub base_url: Option<String>,
    #[validate(custom(function = "validate_prefix"))]
    pub proxy_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub upstream: UpstreamConfig,
    #[validate(nested)]
    pub client: ClientConfig,
    #[validate(length(min = 1))]
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            upstream: UpstreamConfig {
                base_url: "http://localhost:8000".to_string(),
            },
            client: ClientConfig {
                base_url: None,
                proxy_prefix: "/api/proxy".to_string(),
            },
            log_filter: "info".to_string(),
        }
    }
}

fn validate_prefix(prefix: &str) -> std::result::Result<(), ValidationError> {
    if prefix.starts_with('/') && !prefix.contains("..") {
        Ok(())
    } else {
        Err(ValidationError::new("proxy_prefix"))
    }
}

impl AppConfig {
    /// Base URL of the proxy route as seen by the API client.
    pub fn client_base_url(&self) -> String {
        if let Some(base_url) = &self.client.base_url {
            return base_url.clone();
        }
        let host = match self.server.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
            host => host,
        };
        format!("http://{}:{}", host, self.server.port)
    }

    /// Defaults, then `scoring.toml` (or the file named by `SCORING_CONFIG`),
    /// then `SCORING_*` variables with `__` between nested keys.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        config
            .validate()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        Ok(config)
    }
}
