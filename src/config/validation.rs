//! Configuration validation

use super::*;
use crate::error::{Result, ServiceError};
use axum::http::HeaderValue;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server_config(&config.server)?;
    validate_cors_config(&config.cors)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_keep_alive_config(&config.keep_alive)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<()> {
    if config.port == 0 {
        return Err(ServiceError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    if config.host.is_empty() {
        return Err(ServiceError::Config(
            "Server host cannot be empty".to_string()
        ));
    }

    if config.max_body_size_mb == 0 {
        return Err(ServiceError::Config(
            "Max body size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_cors_config(config: &CorsConfig) -> Result<()> {
    for origin in config.production_origins.iter().chain(&config.development_origins) {
        if origin == "*" {
            return Err(ServiceError::Config(
                "Wildcard CORS origin cannot be combined with credentials".to_string()
            ));
        }
        if HeaderValue::from_str(origin).is_err() {
            return Err(ServiceError::Config(
                format!("Invalid CORS origin: {}", origin)
            ));
        }
    }
    Ok(())
}

fn validate_rate_limit_config(config: &RateLimitSettings) -> Result<()> {
    if config.max_requests == 0 {
        return Err(ServiceError::Config(
            "Rate limit max_requests must be greater than 0".to_string()
        ));
    }

    if config.window_secs == 0 {
        return Err(ServiceError::Config(
            "Rate limit window must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_keep_alive_config(config: &KeepAliveConfig) -> Result<()> {
    if config.interval_secs == 0 {
        return Err(ServiceError::Config(
            "Keep-alive interval must be greater than 0".to_string()
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ServiceError::Config(
            "Keep-alive timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    match config.format.as_str() {
        "json" | "compact" | "pretty" => Ok(()),
        other => Err(ServiceError::Config(
            format!("Unknown log format '{}' (expected json, compact or pretty)", other)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_quota_rejected() {
        let mut config = Config::default();
        config.rate_limit.max_requests = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.rate_limit.window_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_wildcard_origin_rejected() {
        let mut config = Config::default();
        config.cors.production_origins = vec!["*".to_string()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }
}
