// SmartIf HTTP client
//
// Wraps `reqwest::Client` with SmartIf-specific URL construction, timeout
// classification, and content-type aware response decoding. Endpoint
// groups (lights, covers, etc.) are implemented as inherent methods in
// the `endpoints` modules to keep this file focused on transport mechanics.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{DEFAULT_PORT, TransportConfig};

/// Raw device-state snapshot as returned by `GET DevicesState`.
pub type RawSnapshot = HashMap<String, serde_json::Value>;

/// A decoded response body.
///
/// The controller answers with JSON for data endpoints and with plain
/// text (often empty) for most actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
}

impl Payload {
    /// The JSON value, or `None` for a text body.
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }
}

/// HTTP client for one SmartIf controller.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct SmartIfClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl SmartIfClient {
    /// Create a client for the controller rooted at `base_url`
    /// (e.g. `http://192.168.1.20:42443/`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client from a bare host and port, using plain HTTP like
    /// the controller itself.
    pub fn from_host(host: &str, port: u16, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = base_url_for(host, port)?;
        Self::new(base_url, transport)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Used by tests and by callers that share a connection pool.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
        }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    /// Fetch the full device-state snapshot.
    ///
    /// `GET DevicesState`
    pub async fn devices_state(&self) -> Result<RawSnapshot, Error> {
        let url = self.endpoint(&["DevicesState"], &[])?;
        self.get_json(url).await
    }

    /// POST to an arbitrary action path such as `Lights/kitchen/TurnOn`.
    ///
    /// `path` is split on `/` and each segment is percent-encoded.
    pub async fn perform_action(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Payload, Error> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let url = self.endpoint(&segments, params)?;
        self.request(Method::POST, url).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a URL under the base from path segments and query pairs.
    pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request and decode the body by content type.
    pub async fn request(&self, method: Method, url: Url) -> Result<Payload, Error> {
        let resp = self.send(method, url).await?;

        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let body = resp.text().await.map_err(|e| self.classify(e))?;

        if !is_json {
            return Ok(Payload::Text(body));
        }

        serde_json::from_str(&body)
            .map(Payload::Json)
            .map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })
    }

    /// Send a GET request and deserialize the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        match self.request(Method::GET, url).await? {
            Payload::Json(value) => {
                let body = value.to_string();
                serde_json::from_value(value).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body,
                })
            }
            Payload::Text(body) => Err(Error::Deserialization {
                message: "expected a JSON response".into(),
                body,
            }),
        }
    }

    /// Send a POST request, discarding the body.
    pub(crate) async fn post(&self, url: Url) -> Result<(), Error> {
        self.request(Method::POST, url).await.map(|_| ())
    }

    /// Send a GET request and return the raw body bytes.
    pub async fn request_binary(&self, url: Url) -> Result<Bytes, Error> {
        let resp = self.send(Method::GET, url).await?;
        resp.bytes().await.map_err(|e| self.classify(e))
    }

    async fn send(&self, method: Method, url: Url) -> Result<reqwest::Response, Error> {
        debug!("{} {}", method, url);

        let path = url.path().trim_start_matches('/').to_owned();
        let resp = self
            .http
            .request(method, url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                path,
            });
        }

        Ok(resp)
    }

    /// Turn reqwest timeouts into [`Error::Timeout`]; keep everything else.
    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// `http://{host}:{port}/`, defaulting the port when zero.
pub fn base_url_for(host: &str, port: u16) -> Result<Url, Error> {
    let port = if port == 0 { DEFAULT_PORT } else { port };
    Ok(Url::parse(&format!("http://{host}:{port}/"))?)
}
