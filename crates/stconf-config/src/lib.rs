//! Shared configuration for stconf.
//!
//! TOML profiles, API key resolution (env + plaintext), discovery of the
//! daemon's own `config.xml`, and translation to
//! `stconf_core::ConnectionConfig`. The CLI layers its flags on top.

pub mod discovery;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stconf_core::{ConnectionConfig, TlsVerification};

pub use discovery::{CredentialSource, DaemonConfigFile, DaemonCredentials, DiscoveryError};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{0}' is not defined")]
    UnknownProfile(String),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named daemon profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named daemon profile. Every field is optional; whatever is missing
/// falls through to the daemon's `config.xml`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Daemon GUI/REST address (e.g., "https://127.0.0.1:8384").
    pub host: Option<String>,

    /// API key (plaintext; prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Explicit path of the daemon's `config.xml`.
    pub daemon_config: Option<PathBuf>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    ///
    /// An explicitly requested profile must exist; a missing default
    /// profile yields an empty one.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        match name {
            Some(name) => self
                .profiles
                .get(name)
                .map(|p| (name.to_owned(), p.clone()))
                .ok_or_else(|| ConfigError::UnknownProfile(name.to_owned())),
            None => {
                let name = self.default_profile.clone().unwrap_or_else(|| "default".into());
                let profile = self.profiles.get(&name).cloned().unwrap_or_default();
                Ok((name, profile))
            }
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "stconf", "stconf").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("stconf");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
///
/// A missing file yields the defaults; a file that fails to parse is an
/// error, never silently replaced.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// `STCONF_DEFAULT_PROFILE` and nested keys such as
/// `STCONF_DEFAULTS__TIMEOUT` override the file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STCONF_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve an API key from a profile: `api_key_env` first, then the
/// plaintext `api_key`. `None` leaves the key to discovery.
pub fn resolve_api_key(profile: &Profile) -> Option<SecretString> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
        tracing::debug!(env = %env_name, "api_key_env is not set");
    }

    profile.api_key.clone().map(SecretString::from)
}

/// TLS verification from the `insecure` / `ca_cert` pair; `insecure` wins.
pub fn tls_verification(insecure: bool, ca_cert: Option<&Path>) -> TlsVerification {
    if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(path) = ca_cert {
        TlsVerification::CustomCa(path.to_path_buf())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ConnectionConfig` from resolved credentials.
pub fn connection_config(
    credentials: DaemonCredentials,
    tls: TlsVerification,
    timeout_secs: u64,
) -> Result<ConnectionConfig, ConfigError> {
    let host: url::Url = credentials
        .host
        .parse()
        .map_err(|e| ConfigError::Validation {
            field: "host".into(),
            reason: format!("invalid URL '{}': {e}", credentials.host),
        })?;
    if !matches!(host.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("expected an http:// or https:// URL, got '{host}'"),
        });
    }

    Ok(ConnectionConfig {
        host,
        api_key: credentials.api_key,
        tls,
        timeout: Duration::from_secs(timeout_secs),
    })
}

/// Build a `ConnectionConfig` from a profile alone, no CLI flag
/// overrides. Missing host or key come from the daemon's `config.xml`.
pub fn profile_to_connection_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ConnectionConfig, ConfigError> {
    let source = DaemonConfigFile::new(profile.daemon_config.clone());
    let credentials = source.resolve(profile.host.as_deref(), resolve_api_key(profile))?;
    let tls = tls_verification(
        profile.insecure.unwrap_or(defaults.insecure),
        profile.ca_cert.as_deref(),
    );
    connection_config(credentials, tls, profile.timeout.unwrap_or(defaults.timeout))
}
