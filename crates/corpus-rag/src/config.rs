//! Configuration for the corpus manager

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// External file search service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// Client-side limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number
    #[serde(default = "default_port")]
    pub port: u16,
    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
    /// Maximum multipart body size in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: true,
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// External file search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the managed API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Generation model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Timeout for store and document management calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for document uploads, in seconds
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
    /// Timeout for grounded generation, in seconds
    #[serde(default = "default_generate_timeout")]
    pub generate_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            request_timeout_secs: default_request_timeout(),
            upload_timeout_secs: default_upload_timeout(),
            generate_timeout_secs: default_generate_timeout(),
        }
    }
}

impl ServiceConfig {
    /// Resolve the API key from the configured environment variable
    pub fn resolve_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).map_err(|_| {
            Error::Config(format!(
                "API key not found in environment variable {}",
                self.api_key_env
            ))
        })
    }
}

/// Client-side limits enforced before any network call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum upload size in bytes
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,
    /// Soft storage threshold per store; exceeding it warns but never fails
    #[serde(default = "default_storage_warn_bytes")]
    pub storage_warn_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: default_max_payload_bytes(),
            storage_warn_bytes: default_storage_warn_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_max_upload_size() -> usize {
    100 * 1024 * 1024 // 100MB, matches the service-side upload limit
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_upload_timeout() -> u64 {
    300
}

fn default_generate_timeout() -> u64 {
    120
}

fn default_max_payload_bytes() -> u64 {
    crate::types::MAX_PAYLOAD_BYTES
}

fn default_storage_warn_bytes() -> u64 {
    15 * 1024 * 1024 * 1024 // warn at 15GB, the recommended store cap is 20GB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.max_payload_bytes, 100 * 1024 * 1024);
        assert!(config.limits.storage_warn_bytes > config.limits.max_payload_bytes);
    }

    #[test]
    fn parses_partial_toml() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [service]
            model = "gemini-2.5-pro"
            "#,
        )
        .expect("valid config");
        assert_eq!(parsed.server.port, 9090);
        assert_eq!(parsed.service.model, "gemini-2.5-pro");
        // untouched sections fall back to defaults
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.service.request_timeout_secs, 30);
    }
}
