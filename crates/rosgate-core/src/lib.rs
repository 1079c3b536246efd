//! Dual-protocol router gateway core.
//!
//! One normalized request/response surface over two mutually incompatible
//! router control protocols -- the legacy binary sentence API and the
//! modern REST/JSON API -- plus the automation engine that enforces
//! billing/lease expiration and WAN failover through idempotent
//! device-side mutations:
//!
//! - **[`ClientFactory`]** -- builds the right protocol client from a
//!   stored [`DeviceRecord`]; the single protocol dispatch point.
//! - **[`DeviceOps`]** -- uniform find/create/update/remove capability
//!   interface both protocol variants implement.
//! - **[`normalize`]** -- maps protocol-specific identifier and field
//!   conventions onto one canonical entity shape.
//! - **[`Gateway`]** -- translates `(router_id, method, path, query,
//!   body)` into the correct wire call, with scoped legacy sessions.
//! - **[`AutomationEngine`]** -- scheduler-job / address-list / queue
//!   upserts and the failover toggle, written once against `DeviceOps`.

pub mod automation;
pub mod client;
pub mod device;
pub mod error;
pub mod gateway;
pub mod normalize;

// ── Primary re-exports ──────────────────────────────────────────────
pub use automation::{AutomationEngine, EngineConfig, LeaseOutcome, LeaseRequest};
pub use automation::expiration::{ExpirationInputs, compute_expiration};
pub use client::{ClientFactory, DeviceOps, RequestMethod, RouterClient};
pub use device::{ApiType, DeviceRecord, RouterDirectory, StaticDirectory};
pub use error::Error;
pub use gateway::{Gateway, GatewayReply};
pub use normalize::{Entity, Protocol};
