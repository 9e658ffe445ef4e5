//! Configuration management for the status service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod loader;
pub mod validation;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub environment: Environment,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitSettings,
    pub keep_alive: KeepAliveConfig,
    pub deployment: DeploymentConfig,
    pub project: ProjectConfig,
    pub logging: LoggingConfig,
}

/// Deployment mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Parse a mode name; anything other than "production" is development
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,

    /// Maximum request body size in MB
    pub max_body_size_mb: usize,

    /// Number of trusted reverse proxies in front of the service
    pub trust_proxy_hops: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            max_body_size_mb: 10,
            trust_proxy_hops: 1,
        }
    }
}

/// CORS allow-lists per environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub production_origins: Vec<String>,
    pub development_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            production_origins: vec!["https://status-service.onrender.com".to_string()],
            development_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    /// Origins allowed for the given environment
    pub fn origins_for(&self, environment: Environment) -> &[String] {
        match environment {
            Environment::Production => &self.production_origins,
            Environment::Development => &self.development_origins,
        }
    }
}

/// Rate limit settings as they appear in configuration files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Maximum requests per window and client
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,

    pub enabled: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 15 * 60,
            enabled: true,
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Human readable quota, e.g. "100 req/15min"
    pub fn describe(&self) -> String {
        if self.window_secs % 60 == 0 {
            format!("{} req/{}min", self.max_requests, self.window_secs / 60)
        } else {
            format!("{} req/{}s", self.max_requests, self.window_secs)
        }
    }
}

/// Self-ping that keeps an idle instance from being suspended by its host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepAliveConfig {
    pub enabled: bool,

    /// Public hostname of this instance (scheme optional)
    pub external_hostname: Option<String>,

    /// Ping interval in seconds
    pub interval_secs: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            external_hostname: None,
            interval_secs: 14 * 60,
            timeout_secs: 30,
        }
    }
}

impl KeepAliveConfig {
    /// Health URL to ping, if a hostname is configured
    pub fn health_url(&self) -> Option<String> {
        let host = self.external_hostname.as_deref()?.trim().trim_end_matches('/');
        if host.is_empty() {
            return None;
        }
        if host.starts_with("http://") || host.starts_with("https://") {
            Some(format!("{}/health", host))
        } else {
            Some(format!("https://{}/health", host))
        }
    }
}

/// Hosting details shown in the metrics payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub provider: String,
    pub region: String,
    pub uptime_monitor: String,
    pub ssl_enabled: bool,
    pub auto_scaling: bool,
    pub load_balancer: bool,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            provider: "Render.com".to_string(),
            region: "US-East".to_string(),
            uptime_monitor: "UptimeRobot".to_string(),
            ssl_enabled: true,
            auto_scaling: true,
            load_balancer: true,
        }
    }
}

/// Descriptive fields returned by the root endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub author: String,
    pub organization: String,
    pub course: String,
    pub development_environment: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Cloud Computing Project".to_string(),
            author: "Your Full Name".to_string(),
            organization: "Your University".to_string(),
            course: "Cloud Computing".to_string(),
            development_environment: "GitHub Codespaces".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,

    /// Log format: json, compact or pretty
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file plus environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let config = loader::load_config(path)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Whether the keep-alive pinger should run
    pub fn keep_alive_active(&self) -> bool {
        self.keep_alive.enabled
            && self.environment.is_production()
            && self.keep_alive.health_url().is_some()
    }
}
