//! Certificate-pinned HTTPS transport.
//!
//! # Design
//! - Outline servers present self-signed certificates, so chain-of-trust and
//!   host-name checks are replaced by a SHA-256 pin on the leaf certificate.
//! - The pin is enforced inside the rustls handshake: a mismatch aborts the
//!   connection before any HTTP bytes are written.
//! - Handshake signatures are still verified, so the peer must hold the key of
//!   the pinned certificate.
//! - The check runs once per TLS connection; pooled connections are reused.

use std::sync::Arc;
use std::time::Duration;

use outline_values::CertFingerprint;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{
    CertificateError, ClientConfig, DigitallySignedStruct, Error as RustlsError, OtherError,
    SignatureScheme,
};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::error::{ApiError, ApiResult};

/// Flat per-request deadline.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reasons a peer certificate fails the pin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinError {
    /// The peer sent an empty certificate list.
    #[error("no certificate presented by peer")]
    NoCertificate,
    /// The leaf certificate hashes to a different fingerprint.
    #[error("certificate SHA256 mismatch: expected {expected}, got {actual}")]
    Mismatch {
        /// Pinned fingerprint, uppercase hex.
        expected: String,
        /// Fingerprint of the presented certificate, uppercase hex.
        actual: String,
    },
}

/// Expected fingerprint of a server's leaf certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePin {
    fingerprint: CertFingerprint,
}

impl CertificatePin {
    /// Pin the given fingerprint (compared case-insensitively).
    #[must_use]
    pub const fn new(fingerprint: CertFingerprint) -> Self {
        Self { fingerprint }
    }

    /// Pinned fingerprint in uppercase hex.
    #[must_use]
    pub fn expected(&self) -> String {
        self.fingerprint.normalized()
    }

    /// Uppercase hex SHA-256 of a DER certificate.
    #[must_use]
    pub fn fingerprint_of(certificate: &[u8]) -> String {
        hex::encode_upper(Sha256::digest(certificate))
    }

    /// Check the first certificate of a presented chain against the pin.
    ///
    /// # Errors
    ///
    /// Returns [`PinError::NoCertificate`] for an empty chain and
    /// [`PinError::Mismatch`] when the leaf digest differs.
    pub fn check(&self, chain: &[CertificateDer<'_>]) -> Result<(), PinError> {
        let leaf = chain.first().ok_or(PinError::NoCertificate)?;
        let digest = Sha256::digest(leaf.as_ref());
        if self.fingerprint.matches_digest(&digest) {
            Ok(())
        } else {
            Err(PinError::Mismatch {
                expected: self.expected(),
                actual: hex::encode_upper(digest),
            })
        }
    }
}

/// rustls verifier that trusts exactly one pinned certificate.
#[derive(Debug)]
pub struct PinnedCertVerifier {
    pin: CertificatePin,
    provider: Arc<CryptoProvider>,
}

impl PinnedCertVerifier {
    /// Build a verifier using `provider` for handshake signature checks.
    #[must_use]
    pub const fn new(pin: CertificatePin, provider: Arc<CryptoProvider>) -> Self {
        Self { pin, provider }
    }
}

impl ServerCertVerifier for PinnedCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        match self.pin.check(std::slice::from_ref(end_entity)) {
            Ok(()) => {
                tracing::debug!(fingerprint = %self.pin.expected(), "peer certificate matches pin");
                Ok(ServerCertVerified::assertion())
            }
            Err(PinError::NoCertificate) => {
                tracing::error!("no certificates provided");
                Err(RustlsError::NoCertificatesPresented)
            }
            Err(err) => {
                tracing::error!(error = %err, "certificate SHA256 mismatch");
                Err(RustlsError::InvalidCertificate(CertificateError::Other(
                    OtherError(Arc::new(err)),
                )))
            }
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// rustls client configuration that trusts only `pin`.
///
/// # Errors
///
/// Returns an error if the crypto provider rejects the default protocol
/// versions.
pub fn pinned_client_config(pin: CertificatePin) -> Result<ClientConfig, RustlsError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = PinnedCertVerifier::new(pin, Arc::clone(&provider));
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    Ok(config)
}

/// HTTP client whose TLS connections must present `fingerprint`.
///
/// # Errors
///
/// Returns [`ApiError::TlsConfig`] or [`ApiError::ClientBuild`] when the
/// client cannot be assembled.
pub fn pinned_http_client(fingerprint: &CertFingerprint) -> ApiResult<reqwest::Client> {
    let config = pinned_client_config(CertificatePin::new(fingerprint.clone()))
        .map_err(|source| ApiError::TlsConfig { source })?;

    reqwest::Client::builder()
        .use_preconfigured_tls(config)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|source| ApiError::ClientBuild { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT: &[u8] = b"not really DER, but the pin only hashes bytes";

    fn pin_for(bytes: &[u8]) -> Result<CertificatePin, outline_values::ValueError> {
        let fingerprint = CertFingerprint::parse(&CertificatePin::fingerprint_of(bytes))?;
        Ok(CertificatePin::new(fingerprint))
    }

    fn verifier_for(pin: CertificatePin) -> PinnedCertVerifier {
        PinnedCertVerifier::new(pin, Arc::new(rustls::crypto::ring::default_provider()))
    }

    fn verify(verifier: &PinnedCertVerifier, cert: &[u8]) -> Result<(), RustlsError> {
        let server_name = ServerName::try_from("example.com")
            .map_err(|_| RustlsError::General("server name".into()))?;
        verifier
            .verify_server_cert(
                &CertificateDer::from(cert.to_vec()),
                &[],
                &server_name,
                &[],
                UnixTime::now(),
            )
            .map(|_| ())
    }

    #[test]
    fn pin_accepts_matching_leaf_in_any_case() -> Result<(), Box<dyn std::error::Error>> {
        let lower = CertificatePin::fingerprint_of(CERT).to_ascii_lowercase();
        let pin = CertificatePin::new(CertFingerprint::parse(&lower)?);
        pin.check(&[CertificateDer::from(CERT.to_vec())])?;
        Ok(())
    }

    #[test]
    fn pin_only_inspects_first_certificate() -> Result<(), Box<dyn std::error::Error>> {
        let pin = pin_for(CERT)?;
        let chain = [
            CertificateDer::from(CERT.to_vec()),
            CertificateDer::from(b"intermediate".to_vec()),
        ];
        pin.check(&chain)?;

        let reversed = [chain[1].clone(), chain[0].clone()];
        assert!(matches!(
            pin.check(&reversed),
            Err(PinError::Mismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn pin_rejects_empty_chain() -> Result<(), Box<dyn std::error::Error>> {
        let pin = pin_for(CERT)?;
        assert_eq!(pin.check(&[]), Err(PinError::NoCertificate));
        Ok(())
    }

    #[test]
    fn pin_reports_both_fingerprints_on_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        let pin = pin_for(b"other certificate")?;
        let err = pin
            .check(&[CertificateDer::from(CERT.to_vec())])
            .expect_err("different certificate must not match");
        assert_eq!(
            err,
            PinError::Mismatch {
                expected: CertificatePin::fingerprint_of(b"other certificate"),
                actual: CertificatePin::fingerprint_of(CERT),
            }
        );
        Ok(())
    }

    #[test]
    fn verifier_accepts_pinned_certificate() -> Result<(), Box<dyn std::error::Error>> {
        let verifier = verifier_for(pin_for(CERT)?);
        verify(&verifier, CERT)?;
        Ok(())
    }

    #[test]
    fn verifier_rejects_other_certificate() -> Result<(), Box<dyn std::error::Error>> {
        let verifier = verifier_for(pin_for(b"other certificate")?);
        let err = verify(&verifier, CERT).expect_err("pin mismatch must fail");
        assert!(matches!(
            err,
            RustlsError::InvalidCertificate(CertificateError::Other(_))
        ));
        Ok(())
    }

    #[test]
    fn pinned_client_config_builds() -> Result<(), Box<dyn std::error::Error>> {
        let config = pinned_client_config(pin_for(CERT)?)?;
        assert!(config.alpn_protocols.is_empty());
        let fingerprint = CertFingerprint::parse(&CertificatePin::fingerprint_of(CERT))?;
        pinned_http_client(&fingerprint)?;
        Ok(())
    }
}
