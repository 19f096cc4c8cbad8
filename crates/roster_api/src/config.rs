//! Layered server configuration.
//!
//! Precedence, lowest first: built-in defaults, `config/default.toml`,
//! `config/local.toml`, then `ROSTER__*` environment variables
//! (`ROSTER__SERVER__PORT=9000`).

use config::{Config, ConfigError, Environment, File};
use roster_core::Order;
use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Database path that selects a private in-memory database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub paging: PagingConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        Ok(SocketAddr::from((self.host.parse::<IpAddr>()?, self.port)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`.
    pub path: String,
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_DATABASE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rotated log files. Logs go to stderr when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Defaults applied to `GET /members` when the query omits a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingConfig {
    pub default_page: u32,
    pub default_size: u32,
    /// Larger requested sizes are clamped to this value.
    pub max_size: u32,
    /// Sort used when the query has no `sort` parameter, as `property,direction`.
    pub default_sort: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Number of sample members inserted at startup into an empty database.
    pub members: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("ROSTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.host.trim().is_empty() {
            return Err("server host cannot be empty".to_string());
        }
        if self.server.request_timeout_secs == 0 {
            return Err("server request_timeout_secs must be greater than 0".to_string());
        }

        if self.database.path.trim().is_empty() {
            return Err("database path cannot be empty".to_string());
        }

        if self.logging.level.trim().is_empty() {
            return Err("logging level cannot be empty".to_string());
        }
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(format!(
                    "logging dir must be an absolute path, got `{}`",
                    dir.display()
                ));
            }
        }

        if self.paging.max_size == 0 {
            return Err("paging max_size must be greater than 0".to_string());
        }
        if self.paging.default_size == 0 || self.paging.default_size > self.paging.max_size {
            return Err(format!(
                "paging default_size must be between 1 and {}",
                self.paging.max_size
            ));
        }
        self.paging
            .default_sort
            .parse::<Order>()
            .map_err(|err| format!("paging default_sort is invalid: {err}"))?;

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                path: IN_MEMORY_DATABASE.to_string(),
            },
            logging: LoggingConfig {
                level: roster_core::default_log_level().to_string(),
                dir: None,
            },
            paging: PagingConfig {
                default_page: 1,
                default_size: 5,
                max_size: 2000,
                default_sort: "username,desc".to_string(),
            },
            seed: SeedConfig { members: 100 },
        }
    }
}
