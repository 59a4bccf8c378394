// Syncthing REST HTTP client
//
// Wraps `reqwest::Client` with API-key injection, `/rest/` URL
// construction, and status-code mapping. Endpoint groups (config, system)
// are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Header carrying the daemon's API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

const BODY_PREVIEW_CHARS: usize = 200;

/// Async client for a Syncthing daemon's REST API.
///
/// All paths are resolved under `{host}/rest/`. Requests are issued one at
/// a time by callers; the client itself holds no mutable state. Clones
/// share the underlying connection pool.
#[derive(Clone)]
pub struct SyncthingClient {
    http: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for SyncthingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncthingClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SyncthingClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `X-API-Key` as a sensitive default header on every request.
    pub fn from_api_key(
        host: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::InvalidApiKey {
                reason: e.to_string(),
            })?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(host)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(host: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(host)?;
        Ok(Self { http, base_url })
    }

    /// Build the base URL ending in `/rest/`.
    ///
    /// Accepts `http://127.0.0.1:8384`, `http://127.0.0.1:8384/` and
    /// `http://127.0.0.1:8384/rest` alike. A reverse-proxy sub-path is kept.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/rest") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/rest/"));
        }

        Ok(url)
    }

    /// The REST base URL (always ends with `/rest/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments onto the base URL, percent-encoding each one.
    ///
    /// Folder IDs are user-chosen and may contain characters that are not
    /// valid in a raw path, so segments are never joined as strings.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// GET that maps a 404 to `None`.
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(resp).await.map(Some)
    }

    pub(crate) async fn put<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), Error> {
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn post_empty(&self, url: Url) -> Result<(), Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        self.handle_empty(resp).await
    }

    /// DELETE that tolerates a missing target.
    ///
    /// Returns `true` if something was removed, `false` on 404.
    pub(crate) async fn delete(&self, url: Url) -> Result<bool, Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!("DELETE target already absent");
            return Ok(false);
        }
        self.handle_empty(resp).await.map(|()| true)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body,
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let raw = raw.trim();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Error::Authentication {
                message: if raw.is_empty() {
                    format!("daemon rejected the API key (HTTP {})", status.as_u16())
                } else {
                    format!("HTTP {}: {}", status.as_u16(), preview(raw))
                },
            };
        }

        Error::Api {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                preview(raw)
            },
        }
    }
}

/// First few hundred characters of a body, cut on a char boundary.
fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
