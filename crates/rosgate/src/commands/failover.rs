//! WAN failover: status query or all-or-nothing toggle.

use rosgate_core::Gateway;
use serde_json::json;

use crate::cli::FailoverArgs;
use crate::error::CliError;

pub async fn run(gateway: &Gateway, args: &FailoverArgs) -> Result<(), CliError> {
    let output = if args.enable || args.disable {
        let enabled = args.enable;
        let touched = gateway.set_failover(&args.router, enabled).await?;
        json!({ "enabled": enabled, "routesTouched": touched })
    } else {
        let enabled = gateway.failover_enabled(&args.router).await?;
        json!({ "enabled": enabled })
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
