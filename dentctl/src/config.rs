//! Client configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `DENTCTL_CONFIG`
//! environment variable. A missing file is not an error; every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `DENTCTL_` override YAML values
//! 3. **DENTCTL_API_TOKEN** - Special case: sets `api.auth_token`
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `DENTCTL_API__BASE_URL=https://admin.example.com/api` sets the `api.base_url` field.
//!
//! ## Example
//!
//! ```yaml
//! api:
//!   base_url: https://admin.example.com/api
//!   request_timeout: 30s
//! cache:
//!   stale_time: 5m
//!   max_capacity: 1000
//! list:
//!   default_limit: 10
//!   search_debounce: 500ms
//! enable_otel_export: false
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::api::models::pagination::MAX_LIMIT;
use crate::cli::Command;
use crate::errors::Error;

/// Longest accepted search debounce window
const MAX_SEARCH_DEBOUNCE: Duration = Duration::from_secs(10);

/// CLI args: config file location plus the command to run
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "DENTCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without contacting the API.
    #[arg(long)]
    pub validate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Main client configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Backend API connection settings
    pub api: ApiConfig,
    /// Query cache behaviour
    pub cache: CacheConfig,
    /// List view defaults
    pub list: ListConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the REST API; resource paths are appended to it
    pub base_url: Url,
    /// Timeout applied to every request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:3000/api").expect("static URL is valid"),
            request_timeout: Duration::from_secs(30),
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// How long a cached query result is reused before it is refetched
    #[serde(with = "humantime_serde")]
    pub stale_time: Duration,
    /// Maximum number of cached query results
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            max_capacity: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListConfig {
    /// Page size used when none is given
    pub default_limit: u32,
    /// Quiet period before typed search text is committed
    #[serde(with = "humantime_serde")]
    pub search_debounce: Duration,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            search_debounce: Duration::from_millis(500),
        }
    }
}

impl Config {
    /// Load configuration from file and environment, then validate it
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), Error> {
        if !matches!(self.api.base_url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("api.base_url must use http or https, got '{}'", self.api.base_url.scheme()),
            });
        }

        if self.api.request_timeout.is_zero() {
            return Err(Error::Config {
                message: "api.request_timeout must be greater than zero".to_string(),
            });
        }

        if self.api.auth_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::Config {
                message: "api.auth_token is set but empty. Remove it or set DENTCTL_API_TOKEN.".to_string(),
            });
        }

        if self.cache.max_capacity == 0 {
            return Err(Error::Config {
                message: "cache.max_capacity must be at least 1".to_string(),
            });
        }

        if self.list.default_limit == 0 || self.list.default_limit > MAX_LIMIT {
            return Err(Error::Config {
                message: format!(
                    "list.default_limit ({}) must be between 1 and {MAX_LIMIT}",
                    self.list.default_limit
                ),
            });
        }

        if self.list.search_debounce > MAX_SEARCH_DEBOUNCE {
            return Err(Error::Config {
                message: format!(
                    "list.search_debounce ({}) cannot exceed {}",
                    humantime::format_duration(self.list.search_debounce),
                    humantime::format_duration(MAX_SEARCH_DEBOUNCE)
                ),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can override specific values
            .merge(Env::prefixed("DENTCTL_").ignore(&["config", "api_token"]).split("__"))
            .merge(Env::raw().only(&["DENTCTL_API_TOKEN"]).map(|_| "api.auth_token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
            command: None,
        }
    }

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args("missing.yaml"))?;
            assert_eq!(config.api.base_url.as_str(), "http://localhost:3000/api");
            assert_eq!(config.api.request_timeout, Duration::from_secs(30));
            assert_eq!(config.cache.stale_time, Duration::from_secs(300));
            assert_eq!(config.list.default_limit, 10);
            assert_eq!(config.list.search_debounce, Duration::from_millis(500));
            assert!(!config.enable_otel_export);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_values() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
api:
  base_url: https://admin.example.com/api/v1
  request_timeout: 5s
cache:
  stale_time: 30s
  max_capacity: 50
list:
  default_limit: 25
  search_debounce: 300ms
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.api.base_url.as_str(), "https://admin.example.com/api/v1");
            assert_eq!(config.api.request_timeout, Duration::from_secs(5));
            assert_eq!(config.cache.stale_time, Duration::from_secs(30));
            assert_eq!(config.cache.max_capacity, 50);
            assert_eq!(config.list.default_limit, 25);
            assert_eq!(config.list.search_debounce, Duration::from_millis(300));

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
api:
  base_url: https://admin.example.com/api
list:
  default_limit: 25
"#,
            )?;

            jail.set_env("DENTCTL_API__BASE_URL", "http://127.0.0.1:4000");
            jail.set_env("DENTCTL_API_TOKEN", "token-from-env");
            jail.set_env("DENTCTL_CONFIG", "test.yaml");

            let config = Config::load(&args("test.yaml"))?;

            // Env vars should override
            assert_eq!(config.api.base_url.as_str(), "http://127.0.0.1:4000/");
            assert_eq!(config.api.auth_token.as_deref(), Some("token-from-env"));

            // YAML values should be preserved
            assert_eq!(config.list.default_limit, 25);

            Ok(())
        });
    }

    #[test]
    fn test_unknown_field_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "api:\n  base_uri: http://localhost\n")?;
            assert!(Config::load(&args("test.yaml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_bad_scheme() {
        let mut config = Config::default();
        config.api.base_url = Url::parse("ftp://files.example.com").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_validation_rejects_limits() {
        let mut config = Config::default();
        config.list.default_limit = 0;
        assert!(config.validate().is_err());

        config.list.default_limit = MAX_LIMIT + 1;
        assert!(config.validate().is_err());

        config.list.default_limit = MAX_LIMIT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_long_debounce_and_zero_capacity() {
        let mut config = Config::default();
        config.list.search_debounce = Duration::from_secs(11);
        assert!(config.validate().unwrap_err().to_string().contains("search_debounce"));

        let mut config = Config::default();
        config.cache.max_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        let mut config = Config::default();
        config.api.auth_token = Some("   ".to_string());
        assert!(config.validate().is_err());
    }
}
