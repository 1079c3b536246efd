// ── Device-side script generation ──
//
// The deactivation logic runs on the router itself, as script text
// attached to a one-shot scheduler job. Codegen is a pure function over
// primitive values so the exact command text is testable without any
// device connection. Interpolated values are validated up front: a quote
// or bracket smuggled into an address would otherwise only surface as a
// device-reported trap at execution time.

use crate::error::Error;

/// Deterministic scheduler-job name for a subscriber address.
///
/// Non-alphanumeric characters are replaced so the name is a valid
/// identifier: `10.0.0.5` becomes `expire-10-0-0-5`.
pub fn job_name(address: &str) -> String {
    let safe: String = address
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("expire-{safe}")
}

/// Validate a value before interpolating it into script text.
///
/// Addresses and hardware addresses only ever contain alphanumerics plus
/// `.`, `:` and `/` -- anything else (quotes, backslashes, brackets,
/// whitespace) would break the script's quoting or inject commands.
fn validate_interpolated(field: &'static str, value: &str) -> Result<(), Error> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '/'));
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidValue {
            field,
            value: value.to_owned(),
        })
    }
}

/// List names come from configuration; same charset discipline, plus the
/// separators list names conventionally use.
fn validate_list_name(field: &'static str, value: &str) -> Result<(), Error> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidValue {
            field,
            value: value.to_owned(),
        })
    }
}

/// Build the deactivation command executed at expiration time.
///
/// In order: (1) drop the subscriber's address from the authorized list;
/// (2) kill live connections sourced from that address; (3) if a DHCP
/// lease still exists, re-add the address to the pending list with a
/// one-day timeout, tagged with the hardware address -- a still-active
/// lease is re-marked as pending rather than silently lost.
pub fn deactivation_script(
    address: &str,
    hardware_address: &str,
    authorized_list: &str,
    pending_list: &str,
) -> Result<String, Error> {
    validate_interpolated("address", address)?;
    validate_interpolated("hardware address", hardware_address)?;
    validate_list_name("authorized list", authorized_list)?;
    validate_list_name("pending list", pending_list)?;

    Ok(format!(
        "/ip firewall address-list remove [find where list=\"{authorized_list}\" && address=\"{address}\"]; \
/ip firewall connection remove [find where src-address~\"{address}\"]; \
:local lease [/ip dhcp-server lease find where address=\"{address}\"]; \
:if ([:len $lease] > 0) do={{/ip firewall address-list add list=\"{pending_list}\" \
address=\"{address}\" timeout=1d comment=\"{hardware_address}\"}}"
    ))
}
