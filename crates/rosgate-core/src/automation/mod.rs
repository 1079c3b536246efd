// Upsert-automation engine
//
// Billing/lease lifecycle enforcement and WAN failover toggling, expressed
// as idempotent device-side mutations: a one-shot scheduler job carrying
// generated deactivation script, an address-list comment anchoring lease
// state, and a simple queue for rate limiting. Everything runs once
// against `DeviceOps`, so both protocols observe identical behavior.

pub mod engine;
pub mod expiration;
pub mod script;

pub use engine::{AutomationEngine, EngineConfig, LeaseOutcome, LeaseRequest};
pub use expiration::{ExpirationInputs, compute_expiration};
