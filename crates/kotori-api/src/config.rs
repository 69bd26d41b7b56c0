//! Configuration management for the Kotori webhook bot service.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use kotori_line::client::LineConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The service works out-of-the-box with production-ready defaults.
/// Create `config.toml` to customize configuration for your environment.
/// Use environment variables for deployment-specific overrides.
///
/// # Example
///
/// ```no_run
/// use kotori_api::Config;
///
/// // Load configuration from all sources
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Secret store
    /// Base URL of the secret-store sidecar.
    ///
    /// Environment variable: `SECRET_STORE_URL`
    #[serde(default = "default_secret_store_url", alias = "SECRET_STORE_URL")]
    pub secret_store_url: String,
    /// Name of the credential entry in the secret store.
    ///
    /// Environment variable: `SECRET_NAME`
    #[serde(default = "default_secret_name", alias = "SECRET_NAME")]
    pub secret_name: String,

    // Messaging platform
    /// Base URL for the reply API.
    ///
    /// Environment variable: `LINE_API_URL`
    #[serde(default = "default_line_api_url", alias = "LINE_API_URL")]
    pub line_api_url: String,
    /// Base URL for the media content API.
    ///
    /// Environment variable: `LINE_DATA_URL`
    #[serde(default = "default_line_data_url", alias = "LINE_DATA_URL")]
    pub line_data_url: String,
    /// HTTP timeout for platform API calls in seconds.
    ///
    /// Environment variable: `LINE_TIMEOUT_SECONDS`
    #[serde(default = "default_line_timeout", alias = "LINE_TIMEOUT_SECONDS")]
    pub line_timeout_seconds: u64,

    // Object storage
    /// Endpoint of the S3-compatible object store.
    ///
    /// Environment variable: `STORAGE_URL`
    #[serde(default = "default_storage_url", alias = "STORAGE_URL")]
    pub storage_url: String,
    /// Bucket that receives uploaded media.
    ///
    /// Environment variable: `STORAGE_BUCKET`
    #[serde(default = "default_storage_bucket", alias = "STORAGE_BUCKET")]
    pub storage_bucket: String,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (e.g., `SECRET_STORE_URL`, `PORT`)
    /// 2. Configuration file (`config.toml`)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the messaging client's configuration type.
    pub fn to_line_config(&self) -> LineConfig {
        LineConfig {
            api_url: self.line_api_url.clone(),
            data_url: self.line_data_url.clone(),
            timeout: Duration::from_secs(self.line_timeout_seconds),
        }
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.secret_name.is_empty() {
            anyhow::bail!("secret_name must not be empty");
        }

        if self.storage_bucket.is_empty() {
            anyhow::bail!("storage_bucket must not be empty");
        }

        if self.line_timeout_seconds == 0 {
            anyhow::bail!("line_timeout_seconds must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            secret_store_url: default_secret_store_url(),
            secret_name: default_secret_name(),
            line_api_url: default_line_api_url(),
            line_data_url: default_line_data_url(),
            line_timeout_seconds: default_line_timeout(),
            storage_url: default_storage_url(),
            storage_bucket: default_storage_bucket(),
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_secret_store_url() -> String {
    "http://127.0.0.1:2773".to_string()
}

fn default_secret_name() -> String {
    "line-bot-credentials".to_string()
}

fn default_line_api_url() -> String {
    "https://api.line.me".to_string()
}

fn default_line_data_url() -> String {
    "https://api-data.line.me".to_string()
}

fn default_line_timeout() -> u64 {
    30
}

fn default_storage_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_storage_bucket() -> String {
    "line-bot-media".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    #[test]
    fn default_config_is_valid() {
        let _guard = TestEnvGuard::new();
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.port, 8080);
        assert_eq!(config.secret_name, "line-bot-credentials");
        assert_eq!(config.storage_bucket, "line-bot-media");
        assert_eq!(config.line_api_url, "https://api.line.me");
        assert_eq!(config.line_data_url, "https://api-data.line.me");
    }

    #[test]
    fn env_variables_override_defaults() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("HOST", "0.0.0.0");
        guard.set_var("PORT", "9090");
        guard.set_var("SECRET_STORE_URL", "http://secrets.internal:2773");
        guard.set_var("SECRET_NAME", "prod-line-credentials");
        guard.set_var("STORAGE_URL", "http://minio.internal:9000");
        guard.set_var("STORAGE_BUCKET", "prod-media");
        guard.set_var("RUST_LOG", "info,kotori=debug");

        let config = Config::load().expect("Config should load with env overrides");

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.secret_store_url, "http://secrets.internal:2773");
        assert_eq!(config.secret_name, "prod-line-credentials");
        assert_eq!(config.storage_url, "http://minio.internal:9000");
        assert_eq!(config.storage_bucket, "prod-media");
        assert_eq!(config.rust_log, "info,kotori=debug");
    }

    #[test]
    fn invalid_config_validation_fails() {
        let _guard = TestEnvGuard::new();
        let mut config = Config::default();

        config.port = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.secret_name = String::new();
        assert!(config.validate().is_err());

        config = Config::default();
        config.storage_bucket = String::new();
        assert!(config.validate().is_err());

        config = Config::default();
        config.line_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn line_config_conversion() {
        let _guard = TestEnvGuard::new();
        let mut config = Config::default();
        config.line_api_url = "http://localhost:1234".to_string();
        config.line_timeout_seconds = 5;

        let line = config.to_line_config();
        assert_eq!(line.api_url, "http://localhost:1234");
        assert_eq!(line.timeout, Duration::from_secs(5));
    }

    #[test]
    fn socket_address_parsing() {
        let _guard = TestEnvGuard::new();
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 9000;

        let addr = config.parse_server_addr().expect("Should parse socket address");

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9000);
    }
}
