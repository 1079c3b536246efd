// Legacy API client modules
//
// Hand-written client for the router's legacy binary sentence protocol:
// length-prefixed words over TCP (TLS on port 8729), command words like
// `/ip/firewall/address-list/print`, and `!re`/`!done`/`!trap` replies.

pub mod client;
pub mod proto;

pub use client::LegacySession;
