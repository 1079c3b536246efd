// ── Generic gateway endpoint ──
//
// Translates `(router_id, method, resource_path, query, body)` into the
// correct wire call for the addressed router's protocol and returns a
// normalized reply. Also hosts the scoped-session wrappers for the
// automation engine, so legacy sessions are always released on every exit
// path -- including failures mid-command.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::debug;

use crate::automation::engine::{AutomationEngine, LeaseOutcome, LeaseRequest};
use crate::client::{ClientFactory, RequestMethod};
use crate::device::{DeviceRecord, RouterDirectory};
use crate::error::Error;

/// Normalized gateway reply: HTTP-shaped status plus normalized body.
#[derive(Debug)]
pub struct GatewayReply {
    pub status: u16,
    pub body: Value,
}

impl GatewayReply {
    /// Render an error as a reply, preserving the upstream status when
    /// the protocol carried one.
    pub fn from_error(err: &Error) -> Self {
        Self {
            status: err.reply_status(),
            body: json!({ "error": err.to_string() }),
        }
    }
}

/// The dual-protocol router gateway.
pub struct Gateway {
    directory: Arc<dyn RouterDirectory>,
    factory: ClientFactory,
    engine: AutomationEngine,
}

impl Gateway {
    pub fn new(directory: Arc<dyn RouterDirectory>) -> Result<Self, Error> {
        Ok(Self {
            directory,
            factory: ClientFactory::new()?,
            engine: AutomationEngine::default(),
        })
    }

    pub fn with_engine(
        directory: Arc<dyn RouterDirectory>,
        engine: AutomationEngine,
    ) -> Result<Self, Error> {
        Ok(Self {
            directory,
            factory: ClientFactory::new()?,
            engine,
        })
    }

    /// Resolve a router id to its device record, before any device I/O.
    fn device(&self, router_id: &str) -> Result<DeviceRecord, Error> {
        self.directory
            .lookup(router_id)
            .ok_or_else(|| Error::RouterNotFound {
                router_id: router_id.to_owned(),
            })
    }

    /// Perform one generic operation against the addressed router.
    ///
    /// The session (when the protocol has one) is opened at call start
    /// and closed at call end regardless of outcome.
    pub async fn call(
        &self,
        router_id: &str,
        method: RequestMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<GatewayReply, Error> {
        debug!("gateway call {router_id} {method:?} {path}");
        let device = self.device(router_id)?;

        let mut client = self.factory.connect(&device).await?;
        let result = client.raw(method, path, query, body).await;
        client.close().await;

        Ok(GatewayReply {
            status: 200,
            body: result?,
        })
    }

    // ── Automation wrappers (scoped sessions) ────────────────────────

    /// Apply the lease-renewal automation for one subscriber.
    pub async fn renew_lease(
        &self,
        router_id: &str,
        request: &LeaseRequest,
        now: DateTime<Utc>,
    ) -> Result<LeaseOutcome, Error> {
        let device = self.device(router_id)?;
        let mut client = self.factory.connect(&device).await?;
        let result = self.engine.apply_lease(&mut client, request, now).await;
        client.close().await;
        result
    }

    /// Whether WAN failover is currently enabled on the router.
    pub async fn failover_enabled(&self, router_id: &str) -> Result<bool, Error> {
        let device = self.device(router_id)?;
        let mut client = self.factory.connect(&device).await?;
        let result = self.engine.failover_enabled(&mut client).await;
        client.close().await;
        result
    }

    /// Toggle WAN failover across all monitored routes.
    pub async fn set_failover(&self, router_id: &str, enabled: bool) -> Result<usize, Error> {
        let device = self.device(router_id)?;
        let mut client = self.factory.connect(&device).await?;
        let result = self.engine.set_failover(&mut client, enabled).await;
        client.close().await;
        result
    }
}
