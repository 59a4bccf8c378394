use thiserror::Error;

/// Top-level error type for the `stconf-api` crate.
///
/// Covers every failure mode of the REST surface: authentication,
/// transport, non-success HTTP answers, and response decoding.
/// `stconf-core` maps these into its reconciliation taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The daemon rejected the API key (HTTP 401 / 403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The API key cannot be sent as an HTTP header value.
    #[error("Invalid API key header value: {reason}")]
    InvalidApiKey { reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status other than an auth rejection.
    #[error("Syncthing API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if no HTTP answer was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_404_is_not_found() {
        let err = Error::Api {
            status: 404,
            message: "no such device".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transport());
    }

    #[test]
    fn authentication_is_not_not_found() {
        let err = Error::Authentication {
            message: "forbidden".into(),
        };
        assert!(!err.is_not_found());
    }
}
