//! Session store configuration
//!
//! Configuration is layered: defaults, then an optional JSON file, then
//! `SESSIONKV_*` environment variables. The resulting [`SessionConfig`] is
//! read-only and shared by reference.

use crate::constants::*;
use crate::errors::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Configuration for a session manager and its backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SessionConfig {
    /// Connection target, `scheme://address`
    pub save_path: String,
    /// Name of the session cookie
    pub session_name: String,
    /// Domain attribute of the session cookie (empty to omit)
    pub cookie_domain: String,
    /// Max-Age of the session cookie in seconds; 0 omits the attribute
    pub cookie_lifetime: i64,
    /// Numerator of the GC sampling ratio
    pub gc_probability: u32,
    /// Denominator of the GC sampling ratio
    pub gc_divisor: u32,
    /// Idle lifetime of a session in seconds (the backend TTL)
    pub gc_max_lifetime: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            save_path: DEFAULT_SAVE_PATH.to_string(),
            session_name: DEFAULT_SESSION_NAME.to_string(),
            cookie_domain: String::new(),
            cookie_lifetime: 0,
            gc_probability: DEFAULT_GC_PROBABILITY,
            gc_divisor: DEFAULT_GC_DIVISOR,
            gc_max_lifetime: DEFAULT_GC_MAX_LIFETIME,
        }
    }
}

/// A parsed `scheme://address` connection target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    pub scheme: String,
    pub address: String,
}

impl SaveTarget {
    /// Split at the first `://`
    pub fn parse(save_path: &str) -> Result<Self> {
        match save_path.split_once(SAVE_PATH_SEPARATOR) {
            Some((scheme, address)) if !scheme.is_empty() && !address.is_empty() => Ok(Self {
                scheme: scheme.to_string(),
                address: address.to_string(),
            }),
            Some(_) => Err(Error::config_invalid(
                save_path,
                "scheme and address must both be non-empty",
            )),
            None => Err(Error::config_invalid(
                save_path,
                format!("expected scheme{SAVE_PATH_SEPARATOR}address"),
            )),
        }
    }
}

impl std::fmt::Display for SaveTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{SAVE_PATH_SEPARATOR}{}", self.scheme, self.address)
    }
}

impl SessionConfig {
    /// Create a builder starting from defaults
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Parse the connection target
    pub fn save_target(&self) -> Result<SaveTarget> {
        SaveTarget::parse(&self.save_path)
    }

    /// Load defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("failed to read config file '{}'", path.display()))?;
        let config: Self = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "loaded session config file");
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `SESSIONKV_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(value) = env_var(SESSIONKV_SAVE_PATH_VAR) {
            self.save_path = value;
        }
        if let Some(value) = env_var(SESSIONKV_SESSION_NAME_VAR) {
            self.session_name = value;
        }
        if let Some(value) = env_var(SESSIONKV_COOKIE_DOMAIN_VAR) {
            self.cookie_domain = value;
        }
        if let Some(value) = env_parse(SESSIONKV_COOKIE_LIFETIME_VAR)? {
            self.cookie_lifetime = value;
        }
        if let Some(value) = env_parse(SESSIONKV_GC_PROBABILITY_VAR)? {
            self.gc_probability = value;
        }
        if let Some(value) = env_parse(SESSIONKV_GC_DIVISOR_VAR)? {
            self.gc_divisor = value;
        }
        if let Some(value) = env_parse(SESSIONKV_GC_MAX_LIFETIME_VAR)? {
            self.gc_max_lifetime = value;
        }
        Ok(())
    }

    /// Check invariants that do not depend on the chosen backend
    pub fn validate(&self) -> Result<()> {
        if self.session_name.trim().is_empty() {
            return Err(Error::configuration("session_name must not be empty"));
        }
        if self.gc_divisor == 0 {
            return Err(Error::configuration("gc_divisor must be greater than zero"));
        }
        self.save_target().map(|_| ())
    }
}

fn env_var(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    debug!(variable = name, "config override from environment");
    Some(value)
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env_var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .context(format!("invalid value '{raw}' for {name}")),
        None => Ok(None),
    }
}

/// Builder for creating session configurations
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection target
    pub fn save_path(mut self, save_path: impl Into<String>) -> Self {
        self.config.save_path = save_path.into();
        self
    }

    /// Set the cookie name
    pub fn session_name(mut self, name: impl Into<String>) -> Self {
        self.config.session_name = name.into();
        self
    }

    /// Set the cookie domain
    pub fn cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.config.cookie_domain = domain.into();
        self
    }

    /// Set the cookie Max-Age in seconds
    pub fn cookie_lifetime(mut self, seconds: i64) -> Self {
        self.config.cookie_lifetime = seconds;
        self
    }

    /// Set the GC sampling ratio
    pub fn gc_ratio(mut self, probability: u32, divisor: u32) -> Self {
        self.config.gc_probability = probability;
        self.config.gc_divisor = divisor;
        self
    }

    /// Set the session idle lifetime in seconds
    pub fn gc_max_lifetime(mut self, seconds: u64) -> Self {
        self.config.gc_max_lifetime = seconds;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<SessionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ALL_VARS: &[&str] = &[
        SESSIONKV_SAVE_PATH_VAR,
        SESSIONKV_SESSION_NAME_VAR,
        SESSIONKV_COOKIE_DOMAIN_VAR,
        SESSIONKV_COOKIE_LIFETIME_VAR,
        SESSIONKV_GC_PROBABILITY_VAR,
        SESSIONKV_GC_DIVISOR_VAR,
        SESSIONKV_GC_MAX_LIFETIME_VAR,
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_save_target_splits_at_first_separator() {
        let target = SaveTarget::parse("tcp://127.0.0.1:6379").unwrap();
        assert_eq!(target.scheme, "tcp");
        assert_eq!(target.address, "127.0.0.1:6379");

        let nested = SaveTarget::parse("unix:///var/run/redis.sock").unwrap();
        assert_eq!(nested.scheme, "unix");
        assert_eq!(nested.address, "/var/run/redis.sock");
        assert_eq!(nested.to_string(), "unix:///var/run/redis.sock");
    }

    #[test]
    fn test_save_target_rejects_missing_separator() {
        let err = SaveTarget::parse("127.0.0.1:6379").unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));

        let err = SaveTarget::parse("tcp://").unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_builder_validates() {
        let config = SessionConfig::builder()
            .save_path("tcp://127.0.0.1:6379")
            .gc_max_lifetime(60)
            .build()
            .unwrap();
        assert_eq!(config.gc_max_lifetime, 60);

        assert!(SessionConfig::builder().session_name("  ").build().is_err());
        assert!(SessionConfig::builder().gc_ratio(1, 0).build().is_err());
        assert!(SessionConfig::builder().save_path("nope").build().is_err());
    }

    #[test]
    fn test_from_file_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"save_path": "file:///tmp/sessions.redb", "gc_max_lifetime": 60}}"#
        )
        .unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.save_path, "file:///tmp/sessions.redb");
        assert_eq!(config.gc_max_lifetime, 60);
        assert_eq!(config.session_name, DEFAULT_SESSION_NAME);
    }

    #[test]
    fn test_from_file_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = SessionConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    #[serial]
    fn test_env_overrides_defaults() {
        clear_env();
        std::env::set_var(SESSIONKV_SAVE_PATH_VAR, "tcp://10.0.0.1:6380");
        std::env::set_var(SESSIONKV_COOKIE_LIFETIME_VAR, "3600");
        std::env::set_var(SESSIONKV_GC_MAX_LIFETIME_VAR, "60");

        let config = SessionConfig::from_env().unwrap();
        assert_eq!(config.save_path, "tcp://10.0.0.1:6380");
        assert_eq!(config.cookie_lifetime, 3600);
        assert_eq!(config.gc_max_lifetime, 60);
        assert_eq!(config.gc_divisor, DEFAULT_GC_DIVISOR);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_rejects_unparseable_numbers() {
        clear_env();
        std::env::set_var(SESSIONKV_GC_DIVISOR_VAR, "many");

        let err = SessionConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(SESSIONKV_GC_DIVISOR_VAR));

        clear_env();
    }
}
