// Shared transport configuration for building protocol clients.
//
// Both the REST and legacy clients share timeout and TLS settings through
// this module, avoiding duplicated builder logic. Routers ship with
// self-signed certificates, so verification is disabled by default -- an
// explicit trust-on-first-use tradeoff.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;

/// Fixed connect/request timeout for every device call.
pub const DEVICE_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared transport configuration for building protocol clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEVICE_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Certificate validation is disabled; rustls negotiates TLS 1.2 as
    /// the floor.
    pub fn build_http_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("rosgate/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(true)
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Build a rustls client config for the legacy TLS session (port 8729).
    ///
    /// Same trust posture as the HTTP client: any certificate is accepted,
    /// TLS 1.2 minimum.
    pub fn build_tls_config(&self) -> Result<Arc<rustls::ClientConfig>, Error> {
        let provider = rustls::crypto::ring::default_provider();
        let config = rustls::ClientConfig::builder_with_provider(Arc::new(provider.clone()))
            .with_protocol_versions(rustls::ALL_VERSIONS)
            .map_err(|e| Error::Tls(format!("failed to build TLS config: {e}")))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert { provider }))
            .with_no_client_auth();
        Ok(Arc::new(config))
    }
}

/// Certificate verifier that accepts any device certificate.
///
/// Signature checks still run against the negotiated key so the handshake
/// remains integrity-protected; only the trust chain is skipped.
#[derive(Debug)]
struct AcceptAnyCert {
    provider: rustls::crypto::CryptoProvider,
}

impl rustls::client::danger::ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
