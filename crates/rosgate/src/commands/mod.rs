//! Subcommand implementations. Each command resolves the gateway from
//! loaded config and prints a JSON result on stdout.

pub mod call;
pub mod failover;
pub mod renew;
