// REST API client for the router's modern control surface.
//
// Stateless HTTP/JSON under `/rest/`, basic auth, identifiers under `.id`.

pub mod client;

pub use client::RestClient;
