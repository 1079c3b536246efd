//! Raw gateway call: `(router, path, method, body, query)` in, normalized
//! JSON out.

use rosgate_core::{Gateway, RequestMethod};
use serde_json::Value;

use crate::cli::CallArgs;
use crate::error::CliError;

pub async fn run(gateway: &Gateway, args: &CallArgs) -> Result<(), CliError> {
    let method: RequestMethod = args.method.parse()?;

    let body: Option<Value> = match &args.data {
        Some(raw) => Some(
            serde_json::from_str(raw).map_err(|e| CliError::Validation {
                field: "data".into(),
                reason: format!("not valid JSON: {e}"),
            })?,
        ),
        None => None,
    };

    let reply = gateway
        .call(&args.router, method, &args.path, &args.query, body.as_ref())
        .await?;

    println!("{}", serde_json::to_string_pretty(&reply.body)?);
    Ok(())
}
