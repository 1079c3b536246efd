//! Lease renewal: runs the upsert-automation engine for one subscriber.

use chrono::{DateTime, Utc};
use rosgate_core::{ExpirationInputs, Gateway, LeaseRequest};
use serde_json::json;

use crate::cli::RenewArgs;
use crate::error::CliError;

pub async fn run(gateway: &Gateway, args: &RenewArgs) -> Result<(), CliError> {
    let manual_expires_at = match &args.expires_at {
        Some(raw) => Some(
            raw.parse::<DateTime<Utc>>()
                .map_err(|e| CliError::Validation {
                    field: "expires-at".into(),
                    reason: format!("not an RFC 3339 timestamp: {e}"),
                })?,
        ),
        None => None,
    };

    let request = LeaseRequest {
        subscriber_id: args.subscriber.clone(),
        address: args.address.clone(),
        hardware_address: args.mac.clone(),
        customer_info: args.customer.clone(),
        contact_number: args.contact.clone(),
        email: args.email.clone(),
        plan_name: args.plan.clone(),
        plan_type: args.plan_type.clone(),
        speed_limit_mbps: args.speed,
        expiration: ExpirationInputs {
            manual_expires_at,
            grace_days: args.grace_days,
            grace_time: args.grace_time.clone(),
            cycle_days: args.cycle_days,
        },
    };

    let outcome = gateway
        .renew_lease(&args.router, &request, Utc::now())
        .await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "expiresAt": outcome.expires_at.to_rfc3339(),
            "jobName": outcome.job_name,
            "commentUpdated": outcome.comment_updated,
            "queueUpdated": outcome.queue_updated,
        }))?
    );
    Ok(())
}
