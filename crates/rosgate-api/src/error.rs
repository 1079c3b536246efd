use thiserror::Error;

/// Top-level error type for the `rosgate-api` crate.
///
/// Covers every failure mode across both wire surfaces: the REST API and
/// the legacy binary sentence API. `rosgate-core` maps these into the
/// gateway-facing taxonomy (configuration / lookup / protocol).
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Socket-level error on the legacy session.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS setup or handshake error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Connect or read timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── REST API ────────────────────────────────────────────────────
    /// Structured error from the REST API.
    #[error("REST API error (HTTP {status}): {message}")]
    Rest { status: u16, message: String },

    // ── Legacy API ──────────────────────────────────────────────────
    /// `!trap` reply from the legacy API. The device aborts the command
    /// but keeps the session open.
    #[error("Legacy API trap: {message}")]
    Trap {
        category: Option<String>,
        message: String,
    },

    /// `!fatal` reply -- the device is closing the session.
    #[error("Legacy API fatal: {message}")]
    Fatal { message: String },

    /// Malformed wire data (bad length prefix, missing reply word, etc.)
    #[error("Legacy protocol violation: {0}")]
    Frame(String),

    /// Login rejected by the device.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Trap message the device uses when a lookup matches nothing.
///
/// A REST call for the same lookup returns an empty array; the safe
/// executor uses this marker to keep both protocol paths equivalent.
pub(crate) const EMPTY_RESULT_MARKER: &str = "no such item";

impl Error {
    /// Returns `true` for the legacy "no matching records" trap.
    ///
    /// This is the only recoverable trap: callers translate it into an
    /// empty result set instead of a failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::Trap { message, .. } if message.contains(EMPTY_RESULT_MARKER))
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::ConnectionRefused
            ),
            _ => false,
        }
    }

    /// The upstream HTTP status code, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rest { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
