// ── Protocol client factory & capability interface ──
//
// One dispatch point for the two control protocols. The factory turns a
// `DeviceRecord` into a `RouterClient` variant; everything above it talks
// through `DeviceOps` (find/create/update/remove) or the gateway's raw
// passthrough and never branches on protocol again.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use rosgate_api::{LegacySession, RestClient, TransportConfig};

use crate::device::{ApiType, DeviceRecord};
use crate::error::Error;
use crate::normalize::{Entity, Protocol, normalize_value, record_to_map};

// ── Request method ───────────────────────────────────────────────────

/// HTTP-shaped method for gateway passthrough calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Reads go through the safe executor / query-filter path.
    pub fn is_read(self) -> bool {
        matches!(self, Self::Get)
    }

    fn as_http(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::str::FromStr for RequestMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(Error::Config {
                message: format!("unsupported method {other:?}"),
            }),
        }
    }
}

// ── Factory ──────────────────────────────────────────────────────────

/// Builds protocol clients from stored device records.
///
/// Holds the shared transport config and one stateless `reqwest::Client`
/// reused by every REST-type device. Legacy sessions are opened fresh per
/// call -- the caller owns the scoped resource and must close it.
pub struct ClientFactory {
    transport: TransportConfig,
    http: reqwest::Client,
}

impl ClientFactory {
    pub fn new() -> Result<Self, Error> {
        Self::with_transport(TransportConfig::default())
    }

    pub fn with_transport(transport: TransportConfig) -> Result<Self, Error> {
        let http = transport.build_http_client()?;
        Ok(Self { transport, http })
    }

    /// Build a client for the device, connecting (and logging in) when
    /// the device speaks the legacy protocol. REST construction does no
    /// network I/O.
    pub async fn connect(&self, device: &DeviceRecord) -> Result<RouterClient, Error> {
        device.validate()?;

        match device.api_type {
            ApiType::Rest => {
                let rest = RestClient::new(
                    &device.host,
                    device.port,
                    &device.user,
                    device.password.clone(),
                    self.http.clone(),
                )?;
                Ok(RouterClient::Rest(rest))
            }
            ApiType::Legacy => {
                let session = LegacySession::connect(
                    &device.host,
                    device.port,
                    &device.user,
                    &device.password,
                    &self.transport,
                )
                .await?;
                Ok(RouterClient::Legacy(session))
            }
        }
    }
}

// ── Capability interface ─────────────────────────────────────────────

/// Uniform find/create/update/remove surface over either protocol.
///
/// Both variants return normalized entities, so the automation engine is
/// written once and behaves identically on both wires: same computed
/// values, same upsert order, differing only in wire calls.
#[async_trait]
pub trait DeviceOps: Send {
    /// Read entries at `path` matching all `filters` (additive AND).
    async fn query(
        &mut self,
        path: &str,
        filters: &[(String, String)],
    ) -> Result<Vec<Entity>, Error>;

    /// Create an entry at `path`.
    async fn create(&mut self, path: &str, params: &[(String, String)]) -> Result<(), Error>;

    /// Update fields of the entry identified by `id`.
    async fn update(
        &mut self,
        path: &str,
        id: &str,
        params: &[(String, String)],
    ) -> Result<(), Error>;

    /// Remove the entry identified by `id`.
    async fn remove(&mut self, path: &str, id: &str) -> Result<(), Error>;
}

// ── Router client variants ───────────────────────────────────────────

/// A live protocol client, one of the two closed variants.
pub enum RouterClient {
    Legacy(LegacySession),
    Rest(RestClient),
}

impl RouterClient {
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Legacy(_) => Protocol::Legacy,
            Self::Rest(_) => Protocol::Rest,
        }
    }

    /// Release the client. Legacy sessions shut their socket down;
    /// REST clients are stateless and drop for free.
    pub async fn close(self) {
        if let Self::Legacy(session) = self {
            session.close().await;
        }
    }

    /// Raw passthrough for the generic gateway endpoint.
    ///
    /// Legacy: command is `/` + path verbatim (the command vocabulary
    /// keeps verb suffixes like `print`); a write body becomes `=k=v`
    /// parameters; reads run through the safe executor with `?k=v`
    /// filters. REST: a read path ending in `/print` has the suffix
    /// stripped (no REST equivalent verb); method and body pass through.
    pub async fn raw(
        &mut self,
        method: RequestMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        match self {
            Self::Legacy(session) => {
                let command = format!("/{}", path.trim_start_matches('/'));
                let records = if method.is_read() {
                    session.read(&command, query).await?
                } else {
                    let attributes = body_params(body);
                    session.talk(&command, &attributes, &[]).await?
                };
                let raw: Vec<Value> = records
                    .into_iter()
                    .map(|r| Value::Object(record_to_map(r)))
                    .collect();
                Ok(normalize_value(Value::Array(raw), Protocol::Legacy))
            }
            Self::Rest(rest) => {
                let path = if method.is_read() {
                    path.strip_suffix("/print").unwrap_or(path)
                } else {
                    path
                };
                let raw = rest.request(method.as_http(), path, query, body).await?;
                Ok(normalize_value(raw, Protocol::Rest))
            }
        }
    }
}

/// Flatten a JSON body object into `=key=value` command parameters.
fn body_params(body: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Object(map)) = body else {
        return Vec::new();
    };
    map.iter()
        .map(|(k, v)| (k.clone(), value_to_param(v)))
        .collect()
}

/// Render a JSON value as the legacy wire expects it (bare strings,
/// unquoted scalars).
fn value_to_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl DeviceOps for RouterClient {
    async fn query(
        &mut self,
        path: &str,
        filters: &[(String, String)],
    ) -> Result<Vec<Entity>, Error> {
        match self {
            Self::Legacy(session) => {
                let command = format!("/{}/print", path.trim_matches('/'));
                let records = session.read(&command, filters).await?;
                Ok(records
                    .into_iter()
                    .map(|r| crate::normalize::normalize_entity(record_to_map(r), Protocol::Legacy))
                    .collect())
            }
            Self::Rest(rest) => {
                let raw = rest.get(path, filters).await?;
                match normalize_value(raw, Protocol::Rest) {
                    Value::Array(items) => Ok(items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::Object(map) => Some(map),
                            _ => None,
                        })
                        .collect()),
                    Value::Object(single) => Ok(vec![single]),
                    Value::Null => Ok(Vec::new()),
                    other => Err(Error::Protocol {
                        status: None,
                        message: format!("unexpected query payload: {other}"),
                    }),
                }
            }
        }
    }

    async fn create(&mut self, path: &str, params: &[(String, String)]) -> Result<(), Error> {
        debug!("create {path}");
        match self {
            Self::Legacy(session) => {
                let command = format!("/{}/add", path.trim_matches('/'));
                session.talk(&command, params, &[]).await?;
                Ok(())
            }
            Self::Rest(rest) => {
                rest.put(path, &params_to_body(params)).await?;
                Ok(())
            }
        }
    }

    async fn update(
        &mut self,
        path: &str,
        id: &str,
        params: &[(String, String)],
    ) -> Result<(), Error> {
        debug!("update {path} {id}");
        match self {
            Self::Legacy(session) => {
                let command = format!("/{}/set", path.trim_matches('/'));
                let mut attributes = vec![(".id".to_owned(), id.to_owned())];
                attributes.extend_from_slice(params);
                session.talk(&command, &attributes, &[]).await?;
                Ok(())
            }
            Self::Rest(rest) => {
                let item_path = format!("{}/{id}", path.trim_end_matches('/'));
                rest.patch(&item_path, &params_to_body(params)).await?;
                Ok(())
            }
        }
    }

    async fn remove(&mut self, path: &str, id: &str) -> Result<(), Error> {
        debug!("remove {path} {id}");
        match self {
            Self::Legacy(session) => {
                let command = format!("/{}/remove", path.trim_matches('/'));
                session
                    .talk(&command, &[(".id".to_owned(), id.to_owned())], &[])
                    .await?;
                Ok(())
            }
            Self::Rest(rest) => {
                let item_path = format!("{}/{id}", path.trim_end_matches('/'));
                rest.delete(&item_path).await?;
                Ok(())
            }
        }
    }
}

/// Build a JSON object body from key/value parameters.
fn params_to_body(params: &[(String, String)]) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing_is_case_insensitive() {
        let method: RequestMethod = "patch".parse().expect("parse");
        assert_eq!(method, RequestMethod::Patch);
        assert!("TRACE".parse::<RequestMethod>().is_err());
    }

    #[test]
    fn only_get_is_a_read() {
        assert!(RequestMethod::Get.is_read());
        assert!(!RequestMethod::Post.is_read());
        assert!(!RequestMethod::Delete.is_read());
    }

    #[test]
    fn body_params_flatten_scalars() {
        let body = serde_json::json!({"list": "authorized", "disabled": false, "ttl": 3});
        let mut params = body_params(Some(&body));
        params.sort();
        assert_eq!(
            params,
            vec![
                ("disabled".to_owned(), "false".to_owned()),
                ("list".to_owned(), "authorized".to_owned()),
                ("ttl".to_owned(), "3".to_owned()),
            ]
        );
    }
}
