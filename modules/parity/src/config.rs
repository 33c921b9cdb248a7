//! Layered application configuration.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. YAML file (optional)
//! 3. environment variables `PARITY__SECTION__KEY`
//! 4. CLI overrides, applied by the binary through [`AppConfig::apply_cli_overrides`]

use std::net::SocketAddr;
use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::secret::SecretString;

pub const ENV_PREFIX: &str = "PARITY__";
pub const MEMORY_DSN: &str = "sqlite::memory:";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {path}")]
    FileNotFound { path: String },
    #[error("invalid configuration: {source}")]
    Invalid {
        #[source]
        source: Box<figment::Error>,
    },
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(source: figment::Error) -> Self {
        Self::Invalid {
            source: Box::new(source),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_owned(),
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub dsn: String,
    pub max_conns: u32,
    pub min_conns: u32,
    pub acquire_timeout_secs: u64,
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://parity.db?mode=rwc".to_owned(),
            max_conns: 10,
            min_conns: 1,
            acquire_timeout_secs: 5,
            sqlx_logging: false,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.dsn.contains(":memory:") || self.dsn.contains("mode=memory")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jwt_secret: None,
            issuer: None,
            leeway_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub prefix: String,
    pub project_name: String,
    /// Widest `end - start` the odd-numbers endpoint accepts.
    pub max_range_span: u64,
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/v1".to_owned(),
            project_name: "Parity Service".to_owned(),
            max_range_span: 100_000,
            default_page_size: 100,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Full `EnvFilter` directive; takes precedence over `level`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
            filter: None,
        }
    }
}

/// Overrides coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub mock: bool,
    pub verbose: u8,
}

impl AppConfig {
    /// Load defaults, then the optional YAML file, then `PARITY__*` env vars.
    ///
    /// # Errors
    /// Returns [`ConfigError::FileNotFound`] for a missing file and
    /// [`ConfigError::Invalid`] when a source cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            figment = figment.merge(Yaml::file(path));
        }
        Ok(Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))?)
    }

    /// Extract from an already-assembled figment.
    ///
    /// # Errors
    /// Returns the figment extraction error.
    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(port) = cli.port {
            self.server.bind_addr = match self.server.bind_addr.parse::<SocketAddr>() {
                Ok(mut addr) => {
                    addr.set_port(port);
                    addr.to_string()
                }
                Err(_) => format!("127.0.0.1:{port}"),
            };
        }
        if cli.mock {
            MEMORY_DSN.clone_into(&mut self.database.dsn);
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
    }

    /// Cross-field checks that serde cannot express.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "server.bind_addr",
                message: e.to_string(),
            })?;

        if self.auth.enabled && self.auth.jwt_secret.as_ref().is_none_or(SecretString::is_empty) {
            return Err(ConfigError::InvalidValue {
                field: "auth.jwt_secret",
                message: "required when auth is enabled".to_owned(),
            });
        }

        if self.environment == Environment::Production && self.database.is_memory() {
            return Err(ConfigError::InvalidValue {
                field: "database.dsn",
                message: "in-memory database is not allowed in production".to_owned(),
            });
        }

        if !self.api.prefix.starts_with('/') || self.api.prefix.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "api.prefix",
                message: "must start with '/' and have no trailing '/'".to_owned(),
            });
        }

        if self.database.min_conns > self.database.max_conns {
            return Err(ConfigError::InvalidValue {
                field: "database.min_conns",
                message: "must not exceed database.max_conns".to_owned(),
            });
        }

        Ok(())
    }

    /// Effective configuration as YAML, secrets redacted.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_saphyr::to_string(self)?)
    }
}
