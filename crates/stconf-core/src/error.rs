// ── Core error types ──
//
// Reconciliation-level errors. Consumers never see raw HTTP status codes
// or reqwest errors; the `From<stconf_api::Error>` impl folds transport
// failures into the taxonomy below.

use thiserror::Error;

use crate::model::EntityKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach Syncthing at {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Request to Syncthing timed out")]
    Timeout,

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Malformed response from Syncthing: {message}")]
    Parse { message: String },

    // ── Reconciliation errors ────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Cannot reconcile {kind} '{id}': {reason}")]
    Precondition {
        kind: EntityKind,
        id: String,
        reason: String,
    },

    #[error("Failed to {action} {kind} '{id}': {message}")]
    Apply {
        kind: EntityKind,
        id: String,
        action: String,
        message: String,
    },

    // ── API errors that fit nowhere else ─────────────────────────────
    #[error("Syncthing API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}

impl CoreError {
    /// Shorthand for a validation failure on a named input field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a failed write with the entity and attempted action.
    pub fn apply(kind: EntityKind, id: &str, action: &str, source: &Self) -> Self {
        Self::Apply {
            kind,
            id: id.to_owned(),
            action: action.to_owned(),
            message: source.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<stconf_api::Error> for CoreError {
    fn from(err: stconf_api::Error) -> Self {
        match err {
            stconf_api::Error::Authentication { message } => CoreError::Auth { message },
            stconf_api::Error::InvalidApiKey { reason } => CoreError::Auth {
                message: format!("API key is not a valid header value: {reason}"),
            },
            stconf_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if let Some(status) = e.status() {
                    CoreError::Api {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Network {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), |u| u.origin().ascii_serialization()),
                        reason: e.to_string(),
                    }
                }
            }
            stconf_api::Error::InvalidUrl(e) => CoreError::Validation {
                field: "host".into(),
                reason: format!("invalid URL: {e}"),
            },
            stconf_api::Error::Tls(reason) => CoreError::Network {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            stconf_api::Error::Api { status, message } => CoreError::Api { status, message },
            stconf_api::Error::Deserialization { message, body: _ } => {
                CoreError::Parse { message }
            }
        }
    }
}
