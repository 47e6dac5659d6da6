//! Client config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `SEARCH_API_URL` or `SEARCH_API_PORT` = service endpoint
//!   (default `http://127.0.0.1:8000`)
//! - `SEARCH_TIMEOUT_SECS`        = search/utility timeout (default 120)
//! - `SEARCH_HEALTH_TIMEOUT_SECS` = health probe timeout (default 5)
//! - `SEARCH_WORKSPACE_FILE`      = workspace state file
//! - `SEARCH_LOG_FILE`            = optional diagnostic log file

use std::path::PathBuf;

use crate::{
    config::client_config::{
        ClientConfig, DEFAULT_API_BASE, DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
        default_workspace_file,
    },
    error_handler::{ConfigError, SearchResult, env_opt_u64, opt_env, validate_http_endpoint},
};

/// Resolves the service endpoint from environment.
///
/// Precedence:
/// 1. `SEARCH_API_URL` if present and non-empty
/// 2. `SEARCH_API_PORT` → `http://127.0.0.1:{port}`
/// 3. [`DEFAULT_API_BASE`]
///
/// # Errors
///
/// - [`ConfigError::InvalidFormat`] if `SEARCH_API_URL` is not http(s)
/// - [`ConfigError::InvalidNumber`] if `SEARCH_API_PORT` is invalid
fn api_endpoint() -> SearchResult<String> {
    if let Some(url) = opt_env("SEARCH_API_URL") {
        validate_http_endpoint("SEARCH_API_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = opt_env("SEARCH_API_PORT") {
        let port = port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "SEARCH_API_PORT",
            reason: "expected u16 (1..=65535)",
        })?;
        return Ok(format!("http://127.0.0.1:{port}"));
    }
    Ok(DEFAULT_API_BASE.to_string())
}

/// Builds a [`ClientConfig`] from the environment, applying defaults for
/// every unset variable.
pub fn config_from_env() -> SearchResult<ClientConfig> {
    let api_base = api_endpoint()?;
    let timeout_secs = env_opt_u64("SEARCH_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
    let health_timeout_secs =
        env_opt_u64("SEARCH_HEALTH_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HEALTH_TIMEOUT_SECS);
    let workspace_file = opt_env("SEARCH_WORKSPACE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(default_workspace_file);
    let log_file = opt_env("SEARCH_LOG_FILE").map(PathBuf::from);

    Ok(ClientConfig {
        api_base,
        timeout_secs,
        health_timeout_secs,
        workspace_file,
        log_file,
    })
}
