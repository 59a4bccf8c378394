//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use stconf_config::{ConfigError, DiscoveryError};
use stconf_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const DISCOVERY: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Syncthing at {url}")]
    #[diagnostic(
        code(stconf::connection_failed),
        help(
            "Check that the daemon is running and its GUI address is reachable.\n\
             Reason: {reason}\n\
             For the default self-signed certificate, try: stconf facts --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to Syncthing timed out")]
    #[diagnostic(
        code(stconf::timeout),
        help("Increase the timeout with --timeout or check the daemon's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(stconf::auth_failed),
        help(
            "Verify the API key (Syncthing GUI: Actions > Settings > General > API Key).\n\
             Pass it with --api-key, STCONF_API_KEY, or a profile."
        )
    )]
    AuthFailed { message: String },

    #[error(transparent)]
    #[diagnostic(
        code(stconf::discovery),
        help(
            "Pass --host and --api-key, point --daemon-config at the daemon's config.xml,\n\
             or store them in a profile: stconf config set-profile NAME --profile-host URL"
        )
    )]
    Discovery(#[from] DiscoveryError),

    // ── Reconciliation ───────────────────────────────────────────────
    #[error("{failed} of {total} entities could not be reconciled")]
    #[diagnostic(
        code(stconf::partial_failure),
        help("See the error column above; the remaining entities were applied.")
    )]
    PartialFailure { failed: usize, total: usize },

    #[error("Cannot reconcile {kind} '{id}': {reason}")]
    #[diagnostic(code(stconf::precondition))]
    Precondition {
        kind: String,
        id: String,
        reason: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Syncthing API error (HTTP {status}): {message}")]
    #[diagnostic(code(stconf::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from Syncthing: {message}")]
    #[diagnostic(
        code(stconf::parse),
        help("The daemon may be too old or not a Syncthing instance. Check --host.")
    )]
    Parse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(stconf::validation))]
    Validation { field: String, reason: String },

    #[error("Cannot load desired state from {path}")]
    #[diagnostic(
        code(stconf::desired_state),
        help("Expected YAML or JSON with top-level `devices` and/or `folders` lists.\n{reason}")
    )]
    DesiredState { path: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(stconf::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: stconf config set-profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(stconf::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render output: {0}")]
    #[diagnostic(code(stconf::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Discovery(_) => exit_code::DISCOVERY,
            Self::Validation { .. }
            | Self::DesiredState { .. }
            | Self::Precondition { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            Self::PartialFailure { .. }
            | Self::ApiError { .. }
            | Self::Parse { .. }
            | Self::Config(_)
            | Self::Io(_)
            | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Auth { message } => CliError::AuthFailed { message },
            CoreError::Parse { message } => CliError::Parse { message },
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },
            CoreError::Precondition { kind, id, reason } => CliError::Precondition {
                kind: kind.to_string(),
                id,
                reason,
            },
            CoreError::Apply {
                kind,
                id,
                action,
                message,
            } => CliError::ApiError {
                status: 0,
                message: format!("{action} {kind} '{id}': {message}"),
            },
            CoreError::Api { status, message } => CliError::ApiError { status, message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Discovery(e) => CliError::Discovery(e),
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile(name) => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(Box::new(other)),
        }
    }
}
