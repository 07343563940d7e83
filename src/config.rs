//! Application configuration
//!
//! Loaded from a TOML file. Every section and field has a default, so a
//! missing file or a partial one is valid:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [security]
//! jwt_secret = "change-me"
//! jwt_expiration_minutes = 60
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [admin]
//! email = "admin@voltedge.local"
//! password = "admin123"
//! ```

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "VOLTEDGE_CONFIG";
/// Environment variable overriding `security.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "VOLTEDGE_JWT_SECRET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
    pub accounts: AccountConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub jwt_issuer: String,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "voltedge-dev-secret-change-in-production".to_string(),
            jwt_expiration_minutes: 60,
            jwt_issuer: "voltedge".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `voltedge=debug,tower_http=info`
    pub level: String,
    /// `json` or `plain`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "plain".to_string(),
        }
    }
}

/// Administrator created at startup when none exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "Administrator".to_string(),
            email: "admin@voltedge.local".to_string(),
            password: "admin123".to_string(),
        }
    }
}

/// Registration rules for new accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub initial_balance: Decimal,
    pub min_password_length: u64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::new(50, 0),
            min_password_length: 6,
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields defaults; an unreadable or
    /// malformed one is an error. The result is validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };

        if let Ok(secret) = std::env::var(JWT_SECRET_ENV) {
            config.security.jwt_secret = secret;
        }

        config.validate()?;
        Ok(config)
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, raw).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret must not be empty".into()));
        }
        if self.security.jwt_expiration_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "security.jwt_expiration_minutes must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "security.bcrypt_cost must be within 4..=31, got {}",
                self.security.bcrypt_cost
            )));
        }
        if self.accounts.initial_balance.is_sign_negative() && !self.accounts.initial_balance.is_zero() {
            return Err(ConfigError::Invalid(
                "accounts.initial_balance must not be negative".into(),
            ));
        }
        if self.admin.enabled
            && (self.admin.email.trim().is_empty() || self.admin.password.is_empty())
        {
            return Err(ConfigError::Invalid(
                "admin.email and admin.password are required when admin.enabled".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// `$VOLTEDGE_CONFIG` if set, else `<config dir>/voltedge/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voltedge")
        .join("config.toml")
}
