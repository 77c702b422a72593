use std::sync::Arc;

use tracing::{error, info};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::scoring_api::ProxyClient;
use crate::interfaces::http::{start_server, HttpState};

/// Load configuration, start logging and serve until shutdown.
pub async fn run() -> std::io::Result<()> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
            error!(error = %e, "Failed to load configuration");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.as_str())
        .try_init();

    let client_base_url = config.client_base_url();
    info!(
        upstream = %config.upstream.base_url,
        client = %client_base_url,
        "Starting credit scoring gateway"
    );

    let api = Arc::new(ProxyClient::new(
        &client_base_url,
        &config.client.proxy_prefix,
    ));
    let state = HttpState::new(api, &config.upstream.base_url);

    start_server(&config, state)?.await
}
