//! Shared helpers for configuration integration tests.

#![allow(unused)]

use std::sync::Arc;

use dtls_config::capability::{CertificateProvider, CertificateVerifier, PskStore};
use dtls_config::certificate::{X509Identity, X509TrustVerifier};
use dtls_config::crypto::{default_provider, CryptoProvider};
use dtls_config::{CertificateType, Config, ConfigBuilder, Error, Platform};
use rcgen::{
    Certificate as RcgenCertificate, CertificateParams, ExtendedKeyUsagePurpose, KeyPair,
    KeyUsagePurpose, SignatureAlgorithm, PKCS_ECDSA_P256_SHA256,
};

/// PSK store that only answers the ECDHE question.
#[derive(Debug)]
pub struct TestPskStore {
    pub ecdhe: bool,
}

impl PskStore for TestPskStore {
    fn has_ecdhe_psk_supported(&self) -> bool {
        self.ecdhe
    }
}

pub fn psk_store(ecdhe: bool) -> Arc<dyn PskStore> {
    Arc::new(TestPskStore { ecdhe })
}

/// Identity that doesn't expose its key material.
#[derive(Debug)]
pub struct OpaqueIdentity;

impl CertificateProvider for OpaqueIdentity {
    fn supported_certificate_types(&self) -> &[CertificateType] {
        &[CertificateType::X509]
    }
}

/// Verifier that doesn't expose its trust anchors.
#[derive(Debug)]
pub struct OpaqueVerifier;

impl CertificateVerifier for OpaqueVerifier {
    fn supported_certificate_types(&self) -> &[CertificateType] {
        &[CertificateType::X509]
    }
}

/// Four cores and the built-in crypto provider.
pub fn platform() -> Platform {
    Platform::new(4, default_provider())
}

pub fn build(builder: ConfigBuilder) -> Result<Config, Error> {
    let _ = env_logger::try_init();
    builder.build_with(&platform())
}

/// Self-signed certificate with the given key usages.
pub fn generate_certificate(
    alg: &'static SignatureAlgorithm,
    key_usages: Vec<KeyUsagePurpose>,
    extended_key_usages: Vec<ExtendedKeyUsagePurpose>,
) -> Vec<u8> {
    let mut params = CertificateParams::new(vec!["dtls.example".to_string()]);
    params.alg = alg;
    params.key_pair = Some(KeyPair::generate(alg).unwrap());
    params.key_usages = key_usages;
    params.extended_key_usages = extended_key_usages;
    RcgenCertificate::from_params(params)
        .unwrap()
        .serialize_der()
        .unwrap()
}

/// P-256 identity usable as client and server.
pub fn ecdsa_identity() -> Arc<dyn CertificateProvider> {
    identity_with_usage(vec![
        ExtendedKeyUsagePurpose::ServerAuth,
        ExtendedKeyUsagePurpose::ClientAuth,
    ])
}

/// P-256 identity restricted to the given extended key usages.
pub fn identity_with_usage(usages: Vec<ExtendedKeyUsagePurpose>) -> Arc<dyn CertificateProvider> {
    let der = generate_certificate(
        &PKCS_ECDSA_P256_SHA256,
        vec![KeyUsagePurpose::DigitalSignature],
        usages,
    );
    Arc::new(X509Identity::from_der_chain([der]).unwrap())
}

/// Verifier trusting a fresh P-256 root.
pub fn trust_verifier() -> Arc<dyn CertificateVerifier> {
    let der = generate_certificate(
        &PKCS_ECDSA_P256_SHA256,
        vec![KeyUsagePurpose::KeyCertSign],
        vec![],
    );
    Arc::new(X509TrustVerifier::from_der_certificates([der]).unwrap())
}
