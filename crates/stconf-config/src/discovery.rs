// ── Daemon credential discovery ──
//
// When the host or API key is not given explicitly, read them from the
// local daemon's own config.xml. Nothing is cached: callers that need the
// credentials again hold on to the returned `DaemonCredentials`.

use std::fmt;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no Syncthing config.xml found (searched: {})", SearchList(searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a usable Syncthing config: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("{} has no GUI {field} configured", path.display())]
    MissingField { path: PathBuf, field: &'static str },
}

struct SearchList<'a>(&'a [PathBuf]);

impl fmt::Display for SearchList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no candidate locations on this platform");
        }
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

// ── Credentials ─────────────────────────────────────────────────────

/// The two things needed to talk to a daemon.
#[derive(Debug, Clone)]
pub struct DaemonCredentials {
    /// Base URL, e.g. `https://127.0.0.1:8384`.
    pub host: String,
    pub api_key: SecretString,
}

/// Supplies whatever part of the credentials the caller did not give.
pub trait CredentialSource {
    fn resolve(
        &self,
        host: Option<&str>,
        api_key: Option<SecretString>,
    ) -> Result<DaemonCredentials, DiscoveryError>;
}

// ── config.xml ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ConfigXml {
    gui: Option<GuiXml>,
}

#[derive(Debug, Deserialize)]
struct GuiXml {
    #[serde(rename = "@tls", default)]
    tls: bool,
    address: Option<String>,
    apikey: Option<String>,
}

/// GUI settings read from a daemon's config.xml.
#[derive(Debug, Clone)]
pub struct GuiSettings {
    pub host: Option<String>,
    pub api_key: Option<SecretString>,
}

/// Reads credentials from the daemon's config.xml, either at a fixed path
/// or at the first existing platform default location.
#[derive(Debug, Clone)]
pub struct DaemonConfigFile {
    candidates: Vec<PathBuf>,
}

impl DaemonConfigFile {
    /// Use `path` when given, otherwise search the platform defaults.
    pub fn new(path: Option<PathBuf>) -> Self {
        path.map_or_else(Self::discover, Self::at)
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            candidates: vec![path],
        }
    }

    pub fn discover() -> Self {
        Self {
            candidates: default_locations(),
        }
    }

    /// The first candidate that exists.
    pub fn locate(&self) -> Result<&Path, DiscoveryError> {
        self.candidates
            .iter()
            .find(|p| p.is_file())
            .map(PathBuf::as_path)
            .ok_or_else(|| DiscoveryError::NotFound {
                searched: self.candidates.clone(),
            })
    }

    /// Parse the GUI section of the located file.
    pub fn read(&self) -> Result<GuiSettings, DiscoveryError> {
        let path = self.locate()?;
        debug!(path = %path.display(), "reading daemon config");
        let raw = std::fs::read_to_string(path).map_err(|source| DiscoveryError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        parse_gui(path, &raw)
    }
}

impl CredentialSource for DaemonConfigFile {
    fn resolve(
        &self,
        host: Option<&str>,
        api_key: Option<SecretString>,
    ) -> Result<DaemonCredentials, DiscoveryError> {
        if let (Some(host), Some(api_key)) = (host, api_key.clone()) {
            return Ok(DaemonCredentials {
                host: host.to_owned(),
                api_key,
            });
        }

        let gui = self.read()?;
        let path = self.locate()?.to_path_buf();
        let host = match host {
            Some(h) => h.to_owned(),
            None => gui.host.ok_or_else(|| DiscoveryError::MissingField {
                path: path.clone(),
                field: "address",
            })?,
        };
        let api_key = match api_key {
            Some(k) => k,
            None => gui.api_key.ok_or(DiscoveryError::MissingField {
                path,
                field: "apikey",
            })?,
        };
        Ok(DaemonCredentials { host, api_key })
    }
}

fn parse_gui(path: &Path, raw: &str) -> Result<GuiSettings, DiscoveryError> {
    let config: ConfigXml =
        quick_xml::de::from_str(raw).map_err(|e| DiscoveryError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let gui = config.gui.ok_or_else(|| DiscoveryError::Malformed {
        path: path.to_path_buf(),
        reason: "missing <gui> section".into(),
    })?;

    let host = match gui.address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        Some(address) if address.starts_with("unix://") => {
            return Err(DiscoveryError::Malformed {
                path: path.to_path_buf(),
                reason: format!("GUI listens on a unix socket ({address}); pass --host"),
            });
        }
        Some(address) => Some(format!(
            "{}://{}",
            if gui.tls { "https" } else { "http" },
            dialable(address)
        )),
        None => None,
    };
    let api_key = gui
        .apikey
        .map(|k| k.trim().to_owned())
        .filter(|k| !k.is_empty())
        .map(SecretString::from);

    Ok(GuiSettings { host, api_key })
}

/// Rewrite wildcard listen addresses to loopback.
fn dialable(address: &str) -> String {
    if let Some(port) = address.strip_prefix("0.0.0.0:") {
        format!("127.0.0.1:{port}")
    } else if let Some(port) = address.strip_prefix("[::]:") {
        format!("[::1]:{port}")
    } else if address.starts_with(':') {
        format!("127.0.0.1{address}")
    } else {
        address.to_owned()
    }
}

/// Platform default locations, most likely first.
pub fn default_locations() -> Vec<PathBuf> {
    let Some(base) = BaseDirs::new() else {
        return Vec::new();
    };

    if cfg!(target_os = "macos") {
        vec![base.data_dir().join("Syncthing").join("config.xml")]
    } else if cfg!(windows) {
        vec![base.data_local_dir().join("Syncthing").join("config.xml")]
    } else {
        let state = base
            .state_dir()
            .map_or_else(|| base.home_dir().join(".local").join("state"), Path::to_path_buf);
        vec![
            state.join("syncthing").join("config.xml"),
            base.config_dir().join("syncthing").join("config.xml"),
        ]
    }
}
