// ── Runtime connection configuration ──
//
// These types describe *how* to reach a Syncthing daemon. They carry the
// resolved credentials and transport tuning but never touch disk; the CLI
// resolves flags, profiles and the daemon's config.xml and hands one in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use stconf_api::{SyncthingClient, TlsMode, TransportConfig};

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Matches `validate_certs: true`.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Matches `validate_certs: false`, needed for the
    /// daemon's stock self-signed certificate.
    DangerAcceptInvalid,
}

impl TlsVerification {
    pub fn validates_certs(&self) -> bool {
        !matches!(self, Self::DangerAcceptInvalid)
    }
}

/// Resolved `{host, api_key, validate_certs}` plus transport tuning.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Daemon GUI/REST address, e.g. `https://127.0.0.1:8384`.
    pub host: Url,
    /// REST API key, sent as `X-API-Key`.
    pub api_key: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(host: Url, api_key: SecretString) -> Self {
        Self {
            host,
            api_key,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build the API client for this connection.
    pub fn client(&self) -> Result<SyncthingClient, CoreError> {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        let transport = TransportConfig {
            tls,
            timeout: self.timeout,
        };
        Ok(SyncthingClient::from_api_key(
            self.host.as_str(),
            &self.api_key,
            &transport,
        )?)
    }
}
