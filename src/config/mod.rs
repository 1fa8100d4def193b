//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `SSAK_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BATCH_PAUSE_MS, DEFAULT_BATCH_SIZE, DEFAULT_CACHE_TTL_SECS, MAX_BATCH_WRITES,
};

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SSAK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Firestore project id. Required by every command that touches the store.
    pub project_id: Option<String>,

    /// Firestore database id. Default: `(default)`.
    pub database: String,

    /// Emulator `host:port`. Falls back to the standard `FIRESTORE_EMULATOR_HOST`.
    pub emulator_host: Option<String>,

    /// OAuth bearer token for the production endpoint.
    pub access_token: Option<String>,

    /// Knowledge cache TTL. Default: 30 minutes.
    pub cache_ttl: Duration,

    /// Documents per upload commit. Default: `400`.
    pub batch_size: usize,

    /// Pause between upload commits. Default: 1s.
    pub batch_pause: Duration,

    /// Optional YAML file overriding the built-in label table.
    pub labels_path: Option<PathBuf>,
}

/// Database id used when `SSAK_DATABASE` is not set.
pub const DEFAULT_DATABASE: &str = "(default)";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            project_id: None,
            database: DEFAULT_DATABASE.to_string(),
            emulator_host: None,
            access_token: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: Duration::from_millis(DEFAULT_BATCH_PAUSE_MS),
            labels_path: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "SSAK_PORT";
    const ENV_BIND_ADDR: &'static str = "SSAK_BIND_ADDR";
    const ENV_PROJECT_ID: &'static str = "SSAK_PROJECT_ID";
    const ENV_DATABASE: &'static str = "SSAK_DATABASE";
    const ENV_EMULATOR_HOST: &'static str = "SSAK_EMULATOR_HOST";
    const ENV_FIRESTORE_EMULATOR_HOST: &'static str = "FIRESTORE_EMULATOR_HOST";
    const ENV_ACCESS_TOKEN: &'static str = "SSAK_ACCESS_TOKEN";
    const ENV_CACHE_TTL_SECS: &'static str = "SSAK_CACHE_TTL_SECS";
    const ENV_BATCH_SIZE: &'static str = "SSAK_BATCH_SIZE";
    const ENV_BATCH_PAUSE_MS: &'static str = "SSAK_BATCH_PAUSE_MS";
    const ENV_LABELS_PATH: &'static str = "SSAK_LABELS_PATH";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let project_id = Self::parse_optional_string_from_env(Self::ENV_PROJECT_ID);
        let database = Self::parse_optional_string_from_env(Self::ENV_DATABASE)
            .unwrap_or(defaults.database);
        let emulator_host = Self::parse_optional_string_from_env(Self::ENV_EMULATOR_HOST)
            .or_else(|| Self::parse_optional_string_from_env(Self::ENV_FIRESTORE_EMULATOR_HOST));
        let access_token = Self::parse_optional_string_from_env(Self::ENV_ACCESS_TOKEN);
        let cache_ttl = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_CACHE_TTL_SECS,
            defaults.cache_ttl.as_secs(),
        )?);
        let batch_size =
            Self::parse_u64_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size as u64)? as usize;
        let batch_pause = Duration::from_millis(Self::parse_u64_from_env(
            Self::ENV_BATCH_PAUSE_MS,
            defaults.batch_pause.as_millis() as u64,
        )?);
        let labels_path =
            Self::parse_optional_string_from_env(Self::ENV_LABELS_PATH).map(PathBuf::from);

        Ok(Self {
            port,
            bind_addr,
            project_id,
            database,
            emulator_host,
            access_token,
            cache_ttl,
            batch_size,
            batch_pause,
            labels_path,
        })
    }

    /// Validates basic invariants (does not contact the store).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::InvalidCacheTtl);
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_WRITES {
            return Err(ConfigError::InvalidBatchSize {
                value: self.batch_size,
                max: MAX_BATCH_WRITES,
            });
        }

        if let Some(ref path) = self.labels_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns the project id or [`ConfigError::MissingEnvVar`].
    pub fn require_project_id(&self) -> Result<&str, ConfigError> {
        self.project_id
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_PROJECT_ID,
            })
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_u64_from_env(var_name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::NumberParseError {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }
}
