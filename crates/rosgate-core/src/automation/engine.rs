// ── Upsert-automation engine ──
//
// Find-or-create/update against the three artifact kinds, plus the WAN
// failover toggle. Natural keys: scheduler job name, list+address pair,
// queue name. Duplicates are detected by lookup before creation -- the
// device enforces no uniqueness of its own. The find-then-replace
// sequences are not transactional; concurrent renewal of the same
// subscriber must be serialized above this layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::automation::expiration::{
    ExpirationInputs, compute_expiration, schedule_start_date, schedule_start_time,
};
use crate::automation::script::{deactivation_script, job_name};
use crate::client::DeviceOps;
use crate::error::Error;
use crate::normalize::Entity;

const SCHEDULER_PATH: &str = "system/scheduler";
const QUEUE_PATH: &str = "queue/simple";
const ADDRESS_LIST_PATH: &str = "ip/firewall/address-list";
const ROUTE_PATH: &str = "ip/route";

// ── Configuration ────────────────────────────────────────────────────

/// Engine knobs: the two address-list names used as billing-state markers.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub authorized_list: String,
    pub pending_list: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            authorized_list: "authorized".into(),
            pending_list: "pending".into(),
        }
    }
}

// ── Requests & outcomes ──────────────────────────────────────────────

/// One subscriber's lease-renewal request.
#[derive(Debug, Clone, Default)]
pub struct LeaseRequest {
    /// Subscriber identifier; names the simple queue.
    pub subscriber_id: String,
    /// Device address of the subscriber; the natural key everywhere else.
    pub address: String,
    /// Hardware (MAC) address, embedded in the deactivation script.
    pub hardware_address: String,
    pub customer_info: String,
    pub contact_number: String,
    pub email: String,
    pub plan_name: String,
    pub plan_type: String,
    /// Symmetric rate limit in Mbit/s; `None` skips the queue upsert.
    pub speed_limit_mbps: Option<u32>,
    pub expiration: ExpirationInputs,
}

/// Comment payload stored on the subscriber's address-list entry.
///
/// The durable, human- and machine-readable anchor for lease state --
/// the device protocols carry no first-class custom-metadata field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub customer_info: String,
    pub contact_number: String,
    pub email: String,
    pub plan_name: String,
    /// Date-only rendering of the expiration (YYYY-MM-DD).
    pub due_date: String,
    /// Full expiration timestamp (YYYY-MM-DD HH:MM:SS).
    pub due_date_time: String,
    pub plan_type: String,
}

impl CommentPayload {
    pub fn new(request: &LeaseRequest, expires_at: DateTime<Utc>) -> Self {
        Self {
            customer_info: request.customer_info.clone(),
            contact_number: request.contact_number.clone(),
            email: request.email.clone(),
            plan_name: request.plan_name.clone(),
            due_date: expires_at.format("%Y-%m-%d").to_string(),
            due_date_time: expires_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            plan_type: request.plan_type.clone(),
        }
    }

    /// Serialize for the comment field.
    pub fn to_comment(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// What a lease application did.
#[derive(Debug, Clone)]
pub struct LeaseOutcome {
    pub expires_at: DateTime<Utc>,
    pub job_name: String,
    /// False when the authorized-list entry was absent (expected to exist
    /// from provisioning; its absence is not an error here).
    pub comment_updated: bool,
    pub queue_updated: bool,
}

// ── Engine ───────────────────────────────────────────────────────────

/// The upsert-automation engine. Stateless apart from configuration.
#[derive(Debug, Clone, Default)]
pub struct AutomationEngine {
    config: EngineConfig,
}

impl AutomationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Apply lease-renewal automation for one subscriber: scheduler job,
    /// optional queue limit, and address-list comment, in that order.
    pub async fn apply_lease(
        &self,
        ops: &mut dyn DeviceOps,
        request: &LeaseRequest,
        now: DateTime<Utc>,
    ) -> Result<LeaseOutcome, Error> {
        let expires_at = compute_expiration(now, &request.expiration);
        let script = deactivation_script(
            &request.address,
            &request.hardware_address,
            &self.config.authorized_list,
            &self.config.pending_list,
        )?;
        let name = job_name(&request.address);

        self.upsert_schedule(ops, &name, &script, expires_at).await?;

        let queue_updated = match request.speed_limit_mbps {
            Some(limit) => {
                self.upsert_queue(ops, &request.subscriber_id, &request.address, limit)
                    .await?;
                true
            }
            None => false,
        };

        let comment = CommentPayload::new(request, expires_at).to_comment();
        let comment_updated = self
            .update_list_comment(ops, &request.address, &comment)
            .await?;

        Ok(LeaseOutcome {
            expires_at,
            job_name: name,
            comment_updated,
            queue_updated,
        })
    }

    /// Find-then-replace the subscriber's one-shot scheduler job.
    ///
    /// Job definitions are not safely patchable in place given interval
    /// semantics, so an existing job is deleted and recreated fresh.
    async fn upsert_schedule(
        &self,
        ops: &mut dyn DeviceOps,
        name: &str,
        script: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let existing = ops
            .query(SCHEDULER_PATH, &[("name".to_owned(), name.to_owned())])
            .await?;
        for job in &existing {
            if let Some(id) = entity_id(job) {
                debug!("replacing scheduler job {name} ({id})");
                ops.remove(SCHEDULER_PATH, id).await?;
            }
        }

        ops.create(
            SCHEDULER_PATH,
            &[
                ("name".to_owned(), name.to_owned()),
                ("on-event".to_owned(), script.to_owned()),
                ("start-date".to_owned(), schedule_start_date(expires_at)),
                ("start-time".to_owned(), schedule_start_time(expires_at)),
                // Zero-length interval: the job fires exactly once.
                ("interval".to_owned(), "00:00:00".to_owned()),
            ],
        )
        .await
    }

    /// Upsert the subscriber's simple queue with a symmetric limit.
    async fn upsert_queue(
        &self,
        ops: &mut dyn DeviceOps,
        subscriber_id: &str,
        address: &str,
        limit_mbps: u32,
    ) -> Result<(), Error> {
        let max_limit = format!("{limit_mbps}M/{limit_mbps}M");
        let existing = ops
            .query(QUEUE_PATH, &[("name".to_owned(), subscriber_id.to_owned())])
            .await?;

        match existing.first().and_then(entity_id) {
            Some(id) => {
                // Only the limit changes on renewal; target stays as
                // provisioned.
                let id = id.to_owned();
                ops.update(QUEUE_PATH, &id, &[("max-limit".to_owned(), max_limit)])
                    .await
            }
            None => {
                ops.create(
                    QUEUE_PATH,
                    &[
                        ("name".to_owned(), subscriber_id.to_owned()),
                        ("target".to_owned(), address.to_owned()),
                        ("max-limit".to_owned(), max_limit),
                    ],
                )
                .await
            }
        }
    }

    /// Set the lease comment on the subscriber's authorized-list entry.
    ///
    /// The entry is expected to exist from provisioning; absence is a
    /// logged no-op, not an error.
    async fn update_list_comment(
        &self,
        ops: &mut dyn DeviceOps,
        address: &str,
        comment: &str,
    ) -> Result<bool, Error> {
        let entries = ops
            .query(
                ADDRESS_LIST_PATH,
                &[
                    ("list".to_owned(), self.config.authorized_list.clone()),
                    ("address".to_owned(), address.to_owned()),
                ],
            )
            .await?;

        match entries.first().and_then(entity_id) {
            Some(id) => {
                let id = id.to_owned();
                ops.update(
                    ADDRESS_LIST_PATH,
                    &id,
                    &[("comment".to_owned(), comment.to_owned())],
                )
                .await?;
                Ok(true)
            }
            None => {
                warn!(
                    "no {} entry for {address}; comment not written",
                    self.config.authorized_list
                );
                Ok(false)
            }
        }
    }

    // ── WAN failover ─────────────────────────────────────────────────

    /// Routes carrying a check-gateway health probe.
    async fn monitored_routes(&self, ops: &mut dyn DeviceOps) -> Result<Vec<Entity>, Error> {
        let routes = ops.query(ROUTE_PATH, &[]).await?;
        Ok(routes
            .into_iter()
            .filter(|r| {
                r.get("check-gateway")
                    .and_then(Value::as_str)
                    .is_some_and(|v| !v.is_empty() && v != "none")
            })
            .collect())
    }

    /// Failover is enabled when at least one monitored route is active.
    pub async fn failover_enabled(&self, ops: &mut dyn DeviceOps) -> Result<bool, Error> {
        let routes = self.monitored_routes(ops).await?;
        Ok(routes.iter().any(|r| !flag(r, "disabled")))
    }

    /// Toggle every monitored route's disabled flag to the complement of
    /// the requested state -- all-or-nothing, not per-route. Returns the
    /// number of routes touched.
    pub async fn set_failover(
        &self,
        ops: &mut dyn DeviceOps,
        enabled: bool,
    ) -> Result<usize, Error> {
        let routes = self.monitored_routes(ops).await?;
        let disabled = if enabled { "no" } else { "yes" };

        let mut touched = 0;
        for route in &routes {
            if let Some(id) = entity_id(route) {
                let id = id.to_owned();
                ops.update(ROUTE_PATH, &id, &[("disabled".to_owned(), disabled.to_owned())])
                    .await?;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

/// The canonical id of a normalized entity, when it has one.
fn entity_id(entity: &Entity) -> Option<&str> {
    entity.get("id").and_then(Value::as_str)
}

/// Device booleans arrive as `"true"`/`"yes"` strings (or JSON bools on
/// the REST wire).
fn flag(entity: &Entity, key: &str) -> bool {
    match entity.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true" || s == "yes",
        _ => false,
    }
}
