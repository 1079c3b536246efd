//! Command-line definition for the `rosgate` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Dual-protocol router gateway: one normalized surface over the legacy
/// binary API and the REST API of a RouterOS fleet.
#[derive(Debug, Parser)]
#[command(name = "rosgate", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the gateway config file (TOML).
    #[arg(long, global = true, env = "ROSGATE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Perform a raw call against a router and print the normalized reply.
    Call(CallArgs),
    /// Apply lease-renewal automation for one subscriber.
    Renew(RenewArgs),
    /// Show or toggle WAN failover across monitored routes.
    Failover(FailoverArgs),
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Router id from the config file.
    pub router: String,

    /// Resource path, e.g. `ip/route/print` or `queue/simple`.
    pub path: String,

    /// Request method (GET, POST, PUT, PATCH, DELETE).
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// JSON request body for write methods.
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Filter pair `key=value`; repeatable, combined as additive AND.
    #[arg(long = "query", short = 'q', value_parser = parse_key_val)]
    pub query: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct RenewArgs {
    /// Router id from the config file.
    pub router: String,

    /// Subscriber identifier (names the simple queue).
    #[arg(long)]
    pub subscriber: String,

    /// Subscriber device address.
    #[arg(long)]
    pub address: String,

    /// Subscriber hardware (MAC) address.
    #[arg(long)]
    pub mac: String,

    #[arg(long, default_value = "")]
    pub customer: String,

    #[arg(long, default_value = "")]
    pub contact: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub plan: String,

    #[arg(long = "plan-type", default_value = "")]
    pub plan_type: String,

    /// Symmetric rate limit in Mbit/s.
    #[arg(long)]
    pub speed: Option<u32>,

    /// Absolute expiration (RFC 3339); overrides every other input.
    #[arg(long = "expires-at")]
    pub expires_at: Option<String>,

    /// Grace period in days from now.
    #[arg(long = "grace-days")]
    pub grace_days: Option<u32>,

    /// Time of day (HH:MM) anchoring the grace period.
    #[arg(long = "grace-time")]
    pub grace_time: Option<String>,

    /// Billing cycle length in days (used when no grace is given).
    #[arg(long = "cycle-days")]
    pub cycle_days: Option<u32>,
}

#[derive(Debug, Args)]
pub struct FailoverArgs {
    /// Router id from the config file.
    pub router: String,

    /// Enable failover on all monitored routes.
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable failover on all monitored routes.
    #[arg(long)]
    pub disable: bool,
}

/// Parse a `key=value` CLI pair.
fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}
