//! Bootstrap configuration loading
//!
//! Settings are resolved once at startup in priority order:
//! 1. Command-line argument / environment variable (parsed by the binary)
//! 2. TOML config file
//! 3. Compiled default (fallback)
//!
//! Nothing here changes while the server runs.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind address
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Default music root, relative to the working directory
pub const DEFAULT_MUSIC_ROOT: &str = "music";

/// Default session lifetime: 60 days
pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 24 * 60 * 60;

/// Description CSV names looked up next to the music root, in order
pub const DESCRIPTION_CSV_NAMES: [&str; 2] = ["Music - list 2.csv", "music_tracks.csv"];

/// Configuration loaded from TOML file
///
/// Every key is optional; missing keys fall back to compiled defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Directory holding `base` and `ver<N>` snapshots
    #[serde(default)]
    pub music_root: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Address to bind (e.g. "127.0.0.1")
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Explicit path to the track description CSV
    #[serde(default)]
    pub descriptions_csv: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Session cookie configuration (optional)
    #[serde(default)]
    pub session: SessionConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: i64,

    /// Force the `Secure` cookie attribute on or off
    ///
    /// When unset, `Secure` follows production mode.
    #[serde(default)]
    pub secure_cookie: Option<bool>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            secure_cookie: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_session_ttl() -> i64 {
    DEFAULT_SESSION_TTL_SECS
}

/// Login credentials checked by `/api/login`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Values taken from the command line or environment
///
/// These win over anything in the TOML file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub music_root: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub descriptions_csv: Option<PathBuf>,
    pub log_level: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub session_secret: Option<String>,
    /// Value of `NODE_ENV` / `CUEDECK_ENV`
    pub environment: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub music_root: PathBuf,
    pub bind_address: String,
    pub port: u16,
    /// Explicit CSV path; when `None` the default names are searched
    pub descriptions_csv: Option<PathBuf>,
    pub log_level: String,
    /// `None` disables authentication
    pub credentials: Option<Credentials>,
    pub session_secret: Option<String>,
    pub session_ttl_secs: i64,
    pub secure_cookie: bool,
}

impl ServerConfig {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: Overrides, toml: TomlConfig) -> Result<Self> {
        let credentials = match (overrides.username, overrides.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Credentials { username, password })
            }
            // USERNAME alone is common in login shells; it does not enable auth
            (_, None) => None,
            _ => {
                return Err(Error::Config(
                    "PASSWORD is set but USERNAME is missing or empty".to_string(),
                ))
            }
        };

        if toml.session.ttl_secs <= 0 {
            return Err(Error::Config(format!(
                "session.ttl_secs must be positive, got {}",
                toml.session.ttl_secs
            )));
        }

        let production = overrides
            .environment
            .as_deref()
            .map(|env| env.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Ok(Self {
            music_root: overrides
                .music_root
                .or(toml.music_root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MUSIC_ROOT)),
            bind_address: overrides
                .bind_address
                .or(toml.bind_address)
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            descriptions_csv: overrides.descriptions_csv.or(toml.descriptions_csv),
            log_level: overrides.log_level.unwrap_or(toml.logging.level),
            credentials,
            session_secret: overrides.session_secret.filter(|s| !s.is_empty()),
            session_ttl_secs: toml.session.ttl_secs,
            secure_cookie: toml.session.secure_cookie.unwrap_or(production),
        })
    }

    /// Whether `/api/*` requires a session
    pub fn auth_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Candidate description CSV paths, in lookup order
    ///
    /// The default names live in the directory containing the music root.
    pub fn description_csv_candidates(&self) -> Vec<PathBuf> {
        if let Some(path) = &self.descriptions_csv {
            return vec![path.clone()];
        }

        let parent = self
            .music_root
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        DESCRIPTION_CSV_NAMES
            .iter()
            .map(|name| parent.join(name))
            .collect()
    }
}

/// Default configuration file path: `<config dir>/cuedeck/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cuedeck").join("config.toml"))
}

/// Load the TOML configuration
///
/// An explicitly requested file must exist. The default file is optional:
/// when absent, a warning is logged and defaults are used.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => {
                warn!("Could not determine config directory, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    if !path.exists() {
        if required {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        warn!("No config file at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}
