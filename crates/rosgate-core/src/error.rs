// ── Core error types ──
//
// Gateway-facing errors. Consumers never see raw reqwest or socket
// failures directly -- the `From<rosgate_api::Error>` impl translates
// wire-level errors into this taxonomy, keeping the richest message and
// the upstream HTTP status when one exists.

use thiserror::Error;

/// Unified error type for the gateway core.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed device record (empty host/user, bad port combination).
    /// Detected before any device I/O.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The directory has no record for the requested router id.
    #[error("Router not found: {router_id}")]
    RouterNotFound { router_id: String },

    /// Device- or protocol-level failure, with the upstream status code
    /// when the protocol carries one (HTTP status for REST).
    #[error("Protocol error: {message}")]
    Protocol {
        status: Option<u16>,
        message: String,
    },

    /// A value destined for generated device-side script text failed
    /// validation (would break quoting or inject commands).
    #[error("Invalid {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

impl Error {
    /// HTTP-ish status for gateway replies: the upstream status when
    /// present, 404 for unknown routers, 502 for device faults without
    /// one, 400 for local validation failures.
    pub fn reply_status(&self) -> u16 {
        match self {
            Self::Config { .. } | Self::InvalidValue { .. } => 400,
            Self::RouterNotFound { .. } => 404,
            Self::Protocol { status, .. } => status.unwrap_or(502),
        }
    }
}

// ── Conversion from wire-level errors ────────────────────────────────

impl From<rosgate_api::Error> for Error {
    fn from(err: rosgate_api::Error) -> Self {
        let status = err.status();
        let message = match &err {
            // Prefer the structured message fields over Display output.
            rosgate_api::Error::Rest { message, .. } => message.clone(),
            rosgate_api::Error::Trap { message, category } => match category {
                Some(cat) => format!("{message} (category {cat})"),
                None => message.clone(),
            },
            rosgate_api::Error::Fatal { message } => format!("session terminated: {message}"),
            rosgate_api::Error::Authentication { message } => {
                format!("authentication failed: {message}")
            }
            other => other.to_string(),
        };
        Self::Protocol { status, message }
    }
}
