// Hand-crafted async HTTP client for the router REST API.
//
// Base path: {scheme}://{host}:{port}/rest/
// Auth: HTTP basic, sent per request so the underlying reqwest client can
// be shared across devices.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;

// ── Error response shape from the REST API ────────────────────────────

/// The device reports failures as `{"error": 400, "message": "Bad
/// Request", "detail": "..."}` where `detail` carries the useful text.
#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the router REST API.
///
/// Stateless: safe to build eagerly and reuse across calls. The scheme is
/// https only on port 443 -- other ports expose the plaintext listener.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    user: String,
    password: SecretString,
}

impl RestClient {
    /// Build a client bound to one device, sharing `http`.
    ///
    /// No network I/O happens here.
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        password: SecretString,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let scheme = if port == 443 { "https" } else { "http" };
        let base_url = Url::parse(&format!("{scheme}://{host}:{port}/rest/"))?;
        Ok(Self {
            http,
            base_url,
            user: user.to_owned(),
            password,
        })
    }

    /// The device-facing base URL (ends with `/rest/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join a resource path (e.g. `ip/route`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// GET a resource, with query pairs as native filter parameters.
    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, Error> {
        self.request(Method::GET, path, query, None).await
    }

    /// PUT creates a new resource entry.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, Error> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    /// PATCH updates fields of an existing entry in place.
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, Error> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    /// DELETE removes an entry.
    pub async fn delete(&self, path: &str) -> Result<Value, Error> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// Generic request entry point used by the gateway passthrough.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut req = self
            .http
            .request(method, url)
            .basic_auth(&self.user, Some(self.password.expose_secret()));
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            if body.is_empty() {
                // DELETE and some writes return 204 with no body.
                return Ok(Value::Null);
            }
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    /// Extract the richest available message from an error body.
    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.detail.or(err.message))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Rest {
            status: status.as_u16(),
            message,
        }
    }
}
