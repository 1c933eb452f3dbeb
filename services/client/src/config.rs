//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: Url,
    pub token_path: PathBuf,
    pub http_timeout: Duration,
    /// An `EnvFilter` directive string, e.g. `warn` or `info,hyper=warn`.
    pub log_filter: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let api_url_str = std::env::var("DOCDESK_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let api_url = parse_api_url(&api_url_str)
            .map_err(|e| ConfigError::InvalidValue("DOCDESK_API_URL".to_string(), e))?;

        let token_path = match std::env::var("DOCDESK_TOKEN_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_token_path()?,
        };

        let timeout_str =
            std::env::var("DOCDESK_HTTP_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let http_timeout = timeout_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DOCDESK_HTTP_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                )
            })?;

        let log_filter_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_string());
        let log_filter = parse_log_filter(&log_filter_str)
            .map_err(|e| ConfigError::InvalidValue("RUST_LOG".to_string(), e))?;

        Ok(Self {
            api_url,
            token_path,
            http_timeout,
            log_filter,
        })
    }

    /// Replaces the API base URL, e.g. from a command-line flag.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(raw)
            .map_err(|e| ConfigError::InvalidValue("--api-url".to_string(), e))?;
        Ok(self)
    }
}

/// Parses a base URL. Only http(s) URLs are accepted.
pub fn parse_api_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

/// Checks a log filter directive, accepting anything `EnvFilter` accepts.
pub fn parse_log_filter(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    EnvFilter::try_new(raw).map_err(|e| format!("'{}' is not a valid log filter: {}", raw, e))?;
    Ok(raw.to_string())
}

fn default_token_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("docdesk").join("session.json"))
        .ok_or_else(|| ConfigError::MissingVar("DOCDESK_TOKEN_PATH".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(parse_api_url("http://localhost:8000").is_ok());
        assert!(parse_api_url(" https://docs.example.com/api/ ").is_ok());
    }

    #[test]
    fn log_filter_accepts_levels_and_directives() {
        assert_eq!(parse_log_filter("WARN").unwrap(), "WARN");
        assert_eq!(parse_log_filter("info,hyper=warn").unwrap(), "info,hyper=warn");
        assert!(parse_log_filter("client_lib=debug").is_ok());
    }

    #[test]
    fn log_filter_rejects_malformed_directives() {
        assert!(parse_log_filter("info,hyper=loud").is_err());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(parse_api_url("ftp://example.com").is_err());
        assert!(parse_api_url("not a url").is_err());
    }
}
