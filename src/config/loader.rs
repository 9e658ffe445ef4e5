//! Configuration loader with environment variable support

use super::{Config, Environment};
use crate::error::{Result, ServiceError};
use config::{Environment as EnvSource, File, FileFormat};
use std::path::Path;

/// Prefix for structured overrides, e.g. `STATUS_SERVICE__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "STATUS_SERVICE";

/// Load configuration from an optional TOML file with environment overrides.
///
/// A missing file is not an error: every field has a default, so the
/// service can run from the environment alone.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let settings = config::Config::builder()
        .add_source(
            File::from(path.as_ref())
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut cfg: Config = settings.try_deserialize()?;
    apply_platform_env(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

/// Apply the plain variables set by the hosting platform.
///
/// `PORT`, `APP_ENV`, `RENDER_EXTERNAL_HOSTNAME` and `RENDER_REGION` take
/// precedence over file and prefixed values.
pub fn apply_platform_env<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        cfg.server.port = port
            .trim()
            .parse()
            .map_err(|_| ServiceError::Config(format!("Invalid PORT value: {}", port)))?;
    }

    if let Some(env) = lookup("APP_ENV") {
        cfg.environment = Environment::from_name(&env);
    }

    if let Some(host) = lookup("RENDER_EXTERNAL_HOSTNAME").filter(|h| !h.trim().is_empty()) {
        cfg.keep_alive.external_hostname = Some(host);
    }

    if let Some(region) = lookup("RENDER_REGION").filter(|r| !r.trim().is_empty()) {
        cfg.deployment.region = region;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_platform_env_overrides() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("PORT", "8080"),
            ("APP_ENV", "production"),
            ("RENDER_EXTERNAL_HOSTNAME", "demo.onrender.com"),
            ("RENDER_REGION", "frankfurt"),
        ]);

        apply_platform_env(&mut config, lookup).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.keep_alive.external_hostname.as_deref(), Some("demo.onrender.com"));
        assert_eq!(config.deployment.region, "frankfurt");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = Config::default();
        let result = apply_platform_env(&mut config, lookup_from(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }

    #[test]
    fn test_empty_platform_values_ignored() {
        let mut config = Config::default();
        apply_platform_env(&mut config, lookup_from(&[("RENDER_REGION", "  ")])).unwrap();
        assert_eq!(config.deployment.region, "US-East");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config("definitely-not-here.toml").unwrap();
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.logging.level, "info");
    }
}
