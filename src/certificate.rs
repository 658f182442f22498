//! Certificate introspection for the configuration.
//!
//! Certificates are parsed once, when an identity or verifier is created. The
//! [`ConfigurationHelper`] then collects what that material implies for the
//! configuration: which key algorithms the identity can authenticate with, which
//! signature algorithms and curves must be offered, and whether the leaf
//! certificate may be used by a client, a server or both.

use std::fmt;

use der::Decode;
use sha2::{Digest, Sha256};
use spki::{ObjectIdentifier, SubjectPublicKeyInfoOwned};
use thiserror::Error;
use x509_cert::ext::pkix::{ExtendedKeyUsage, KeyUsage};
use x509_cert::Certificate as X509Certificate;

use crate::capability::{CertificateProvider, CertificateVerifier, ConfigurationDefaults};
use crate::cipher_suite::CertificateKeyAlgorithm;
use crate::error::ConsistencyError;
use crate::types::{CertificateType, KeyAlgorithm, NamedGroup, SignatureAndHashAlgorithm};

/// Certificate introspection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("invalid certificate format: {0}")]
    InvalidFormat(String),

    #[error("unsupported public key algorithm {0}")]
    UnsupportedKeyAlgorithm(String),

    #[error("unsupported EC curve {0}")]
    UnsupportedCurve(String),

    #[error("unsupported certificate signature algorithm {0}")]
    UnsupportedSignatureAlgorithm(String),

    #[error("certificate chain must contain at least one certificate")]
    EmptyChain,
}

// Public key algorithms
const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const OID_RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const OID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
const OID_ED448: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.113");

// Curves
const OID_P256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const OID_P384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const OID_P521: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");
const OID_SECP256K1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");
const OID_BRAINPOOL_P256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.36.3.3.2.8.1.1.7");
const OID_BRAINPOOL_P384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.36.3.3.2.8.1.1.11");
const OID_BRAINPOOL_P512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.36.3.3.2.8.1.1.13");

// Certificate signature algorithms
const OID_ECDSA_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.1");
const OID_ECDSA_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
const OID_ECDSA_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");
const OID_ECDSA_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4");
const OID_RSA_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
const OID_RSA_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const OID_RSA_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
const OID_RSA_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");

// Extensions
const OID_KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.15");
const OID_EXTENDED_KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.37");
const OID_ANY_EXTENDED_KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.37.0");
const OID_SERVER_AUTH: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.1");
const OID_CLIENT_AUTH: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.2");

/// Calculate a certificate fingerprint using SHA-256
pub fn calculate_fingerprint(cert_der: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(cert_der);
    hasher.finalize().to_vec()
}

/// Format a fingerprint as a colon-separated hex string
/// Example: "AF:12:F6:..."
pub fn format_fingerprint(fingerprint: &[u8]) -> String {
    fingerprint
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<String>>()
        .join(":")
}

/// Extended key usage purposes relevant for DTLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedKeyUsages {
    pub server_auth: bool,
    pub client_auth: bool,
    pub any: bool,
}

/// The parts of an X.509 certificate the configuration cares about.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    der: Vec<u8>,
    key_algorithm: KeyAlgorithm,
    signature_algorithm: SignatureAndHashAlgorithm,
    self_signed: bool,
    /// `None` without a KeyUsage extension.
    digital_signature: Option<bool>,
    /// `None` without an ExtendedKeyUsage extension.
    extended_key_usage: Option<ExtendedKeyUsages>,
}

impl CertificateInfo {
    /// Parse a DER encoded X.509 certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let cert = X509Certificate::from_der(der)
            .map_err(|e| CertificateError::InvalidFormat(e.to_string()))?;
        let tbs = &cert.tbs_certificate;

        let key_algorithm = key_algorithm_of(&tbs.subject_public_key_info)?;
        let signature_algorithm = signature_algorithm_of(&cert.signature_algorithm.oid)?;
        let self_signed = tbs.issuer == tbs.subject;

        let mut digital_signature = None;
        let mut extended_key_usage = None;
        for ext in tbs.extensions.iter().flatten() {
            match ext.extn_id {
                OID_KEY_USAGE => {
                    let usage = KeyUsage::from_der(ext.extn_value.as_bytes())
                        .map_err(|e| CertificateError::InvalidFormat(e.to_string()))?;
                    digital_signature = Some(usage.digital_signature());
                }
                OID_EXTENDED_KEY_USAGE => {
                    let usage = ExtendedKeyUsage::from_der(ext.extn_value.as_bytes())
                        .map_err(|e| CertificateError::InvalidFormat(e.to_string()))?;
                    let mut purposes = ExtendedKeyUsages::default();
                    for oid in &usage.0 {
                        match *oid {
                            OID_SERVER_AUTH => purposes.server_auth = true,
                            OID_CLIENT_AUTH => purposes.client_auth = true,
                            OID_ANY_EXTENDED_KEY_USAGE => purposes.any = true,
                            _ => {}
                        }
                    }
                    extended_key_usage = Some(purposes);
                }
                _ => {}
            }
        }

        Ok(CertificateInfo {
            der: der.to_vec(),
            key_algorithm,
            signature_algorithm,
            self_signed,
            digital_signature,
            extended_key_usage,
        })
    }

    /// The DER encoding this info was parsed from.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Algorithm of the subject public key.
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        self.key_algorithm
    }

    /// Algorithm the issuer signed this certificate with.
    pub fn signature_algorithm(&self) -> SignatureAndHashAlgorithm {
        self.signature_algorithm
    }

    /// Whether issuer and subject are the same.
    pub fn is_self_signed(&self) -> bool {
        self.self_signed
    }

    pub fn extended_key_usage(&self) -> Option<ExtendedKeyUsages> {
        self.extended_key_usage
    }

    /// Whether the certificate may authenticate a client (`true`) or a server (`false`).
    ///
    /// Absent KeyUsage or ExtendedKeyUsage extensions don't restrict the usage.
    pub fn can_be_used_for_authentication(&self, client: bool) -> bool {
        if self.digital_signature == Some(false) {
            return false;
        }
        match self.extended_key_usage {
            None => true,
            Some(usage) if usage.any => true,
            Some(usage) if client => usage.client_auth,
            Some(usage) => usage.server_auth,
        }
    }

    /// SHA-256 fingerprint of the DER encoding.
    pub fn fingerprint(&self) -> Vec<u8> {
        calculate_fingerprint(&self.der)
    }

    /// SHA-256 fingerprint formatted as "AF:12:F6:...".
    pub fn fingerprint_str(&self) -> String {
        format_fingerprint(&self.fingerprint())
    }
}

impl fmt::Debug for CertificateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateInfo")
            .field("fingerprint", &self.fingerprint_str())
            .field("key_algorithm", &self.key_algorithm)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

/// Public key algorithm of a SubjectPublicKeyInfo.
pub fn key_algorithm_of(spki: &SubjectPublicKeyInfoOwned) -> Result<KeyAlgorithm, CertificateError> {
    match spki.algorithm.oid {
        OID_EC_PUBLIC_KEY => {
            let curve_oid: ObjectIdentifier = spki
                .algorithm
                .parameters
                .as_ref()
                .ok_or_else(|| CertificateError::InvalidFormat("missing EC curve".to_string()))?
                .decode_as()
                .map_err(|_| CertificateError::InvalidFormat("invalid EC curve".to_string()))?;
            let group = match curve_oid {
                OID_P256 => NamedGroup::Secp256r1,
                OID_P384 => NamedGroup::Secp384r1,
                OID_P521 => NamedGroup::Secp521r1,
                OID_SECP256K1 => NamedGroup::Secp256k1,
                OID_BRAINPOOL_P256 => NamedGroup::BrainpoolP256r1,
                OID_BRAINPOOL_P384 => NamedGroup::BrainpoolP384r1,
                OID_BRAINPOOL_P512 => NamedGroup::BrainpoolP512r1,
                other => return Err(CertificateError::UnsupportedCurve(other.to_string())),
            };
            Ok(KeyAlgorithm::Ec(group))
        }
        OID_RSA_ENCRYPTION => Ok(KeyAlgorithm::Rsa),
        OID_ED25519 => Ok(KeyAlgorithm::Ed25519),
        OID_ED448 => Ok(KeyAlgorithm::Ed448),
        other => Err(CertificateError::UnsupportedKeyAlgorithm(other.to_string())),
    }
}

fn signature_algorithm_of(
    oid: &ObjectIdentifier,
) -> Result<SignatureAndHashAlgorithm, CertificateError> {
    use SignatureAndHashAlgorithm as S;
    let algorithm = match *oid {
        OID_ECDSA_SHA256 => S::SHA256_WITH_ECDSA,
        OID_ECDSA_SHA384 => S::SHA384_WITH_ECDSA,
        OID_ECDSA_SHA512 => S::SHA512_WITH_ECDSA,
        OID_ECDSA_SHA1 => S::SHA1_WITH_ECDSA,
        OID_RSA_SHA256 => S::SHA256_WITH_RSA,
        OID_RSA_SHA384 => S::SHA384_WITH_RSA,
        OID_RSA_SHA512 => S::SHA512_WITH_RSA,
        OID_RSA_SHA1 => S::SHA1_WITH_RSA,
        OID_ED25519 => S::ED25519,
        OID_ED448 => S::ED448,
        other => return Err(CertificateError::UnsupportedSignatureAlgorithm(other.to_string())),
    };
    Ok(algorithm)
}

fn add_if_absent<T: PartialEq + Copy>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

// ============================================================================
// Configuration helper
// ============================================================================

/// Collects the configuration needs of certificate material.
///
/// Identities and verifiers register their keys and certificates through
/// [`ConfigurationDefaults`]. The finalizer uses the result to extend default
/// signature algorithms and groups and to validate explicit ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationHelper {
    identity_keys: Vec<KeyAlgorithm>,
    identity_certificate: Option<CertificateInfo>,
    chain_signatures: Vec<SignatureAndHashAlgorithm>,
    default_signatures: Vec<SignatureAndHashAlgorithm>,
    default_groups: Vec<NamedGroup>,
}

impl ConfigurationHelper {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_key_defaults(&mut self, key: KeyAlgorithm) {
        add_if_absent(&mut self.default_signatures, key.default_signature_algorithm());
        if let KeyAlgorithm::Ec(group) = key {
            add_if_absent(&mut self.default_groups, group);
        }
    }

    /// Register the public key of the own identity (raw public key).
    pub fn add_identity_public_key(&mut self, key: KeyAlgorithm) {
        add_if_absent(&mut self.identity_keys, key);
        self.add_key_defaults(key);
    }

    /// Register the certificate chain of the own identity, leaf first.
    ///
    /// A trailing self-signed root is not sent to peers, so its signature
    /// does not need to be supported.
    pub fn add_identity_chain(&mut self, chain: &[CertificateInfo]) {
        let Some(leaf) = chain.first() else {
            return;
        };
        self.add_identity_public_key(leaf.key_algorithm());
        if self.identity_certificate.is_none() {
            self.identity_certificate = Some(leaf.clone());
        }

        let signed = match chain.last() {
            Some(root) if chain.len() > 1 && root.is_self_signed() => &chain[..chain.len() - 1],
            _ => chain,
        };
        for cert in signed {
            add_if_absent(&mut self.chain_signatures, cert.signature_algorithm());
            add_if_absent(&mut self.default_signatures, cert.signature_algorithm());
        }
    }

    /// Register a trusted public key (raw public key trust).
    pub fn add_trusted_public_key(&mut self, key: KeyAlgorithm) {
        self.add_key_defaults(key);
    }

    /// Register trusted certificates.
    ///
    /// Peers' chains end at these, so their keys and signatures are needed
    /// to validate what peers send.
    pub fn add_trusted_certificates(&mut self, trusted: &[CertificateInfo]) {
        for cert in trusted {
            self.add_key_defaults(cert.key_algorithm());
            add_if_absent(&mut self.default_signatures, cert.signature_algorithm());
        }
    }

    /// Certificate key algorithms the identity can authenticate with.
    pub fn supported_key_algorithms(&self) -> Vec<CertificateKeyAlgorithm> {
        let mut algorithms = Vec::new();
        for key in &self.identity_keys {
            let algorithm = match key {
                KeyAlgorithm::Rsa => CertificateKeyAlgorithm::Rsa,
                // EdDSA authenticates ECDHE_ECDSA suites (RFC 8422)
                KeyAlgorithm::Ec(_) | KeyAlgorithm::Ed25519 | KeyAlgorithm::Ed448 => {
                    CertificateKeyAlgorithm::Ec
                }
            };
            add_if_absent(&mut algorithms, algorithm);
        }
        algorithms
    }

    /// Leaf certificate of the own identity, if it is an X.509 chain.
    pub fn identity_certificate(&self) -> Option<&CertificateInfo> {
        self.identity_certificate.as_ref()
    }

    /// Signature algorithms the registered material needs.
    pub fn default_signature_algorithms(&self) -> &[SignatureAndHashAlgorithm] {
        &self.default_signatures
    }

    /// Groups (curves) the registered material needs.
    pub fn default_supported_groups(&self) -> &[NamedGroup] {
        &self.default_groups
    }

    /// Verify that every identity key and chain signature is covered.
    pub fn verify_signature_algorithms(
        &self,
        algorithms: &[SignatureAndHashAlgorithm],
    ) -> Result<(), ConsistencyError> {
        for key in &self.identity_keys {
            if !algorithms.iter().any(|a| a.signature.is_usable_with(*key)) {
                return Err(ConsistencyError::KeyWithoutSignatureAlgorithm(*key));
            }
        }
        for signature in &self.chain_signatures {
            if !algorithms.contains(signature) {
                return Err(ConsistencyError::CertificateSignatureNotSupported(*signature));
            }
        }
        Ok(())
    }

    /// Verify that the curve of every EC identity key is a supported group.
    pub fn verify_supported_groups(&self, groups: &[NamedGroup]) -> Result<(), ConsistencyError> {
        for key in &self.identity_keys {
            if let KeyAlgorithm::Ec(curve) = key {
                if !groups.contains(curve) {
                    return Err(ConsistencyError::CurveNotSupported(*curve));
                }
            }
        }
        Ok(())
    }

    /// Whether the identity certificate may authenticate a client or a server.
    ///
    /// Raw public key identities carry no usage restrictions.
    pub fn can_be_used_for_authentication(&self, client: bool) -> bool {
        self.identity_certificate
            .as_ref()
            .map_or(true, |cert| cert.can_be_used_for_authentication(client))
    }
}

// ============================================================================
// Ready-made capabilities
// ============================================================================

static X509_AND_RPK: &[CertificateType] = &[CertificateType::X509, CertificateType::RawPublicKey];
static X509_ONLY: &[CertificateType] = &[CertificateType::X509];
static RPK_ONLY: &[CertificateType] = &[CertificateType::RawPublicKey];

/// Identity backed by an X.509 certificate chain.
///
/// The chain can also be sent as raw public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509Identity {
    chain: Vec<CertificateInfo>,
}

impl X509Identity {
    /// Create an identity from DER encoded certificates, leaf first.
    pub fn from_der_chain<I, C>(chain: I) -> Result<Self, CertificateError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let chain = chain
            .into_iter()
            .map(|der| CertificateInfo::from_der(der.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if chain.is_empty() {
            return Err(CertificateError::EmptyChain);
        }
        Ok(X509Identity { chain })
    }

    /// The certificate chain, leaf first.
    pub fn chain(&self) -> &[CertificateInfo] {
        &self.chain
    }
}

impl CertificateProvider for X509Identity {
    fn supported_certificate_types(&self) -> &[CertificateType] {
        X509_AND_RPK
    }

    fn configuration_defaults(&self) -> Option<&dyn ConfigurationDefaults> {
        Some(self)
    }
}

impl ConfigurationDefaults for X509Identity {
    fn setup_configuration_helper(&self, helper: &mut ConfigurationHelper) {
        helper.add_identity_chain(&self.chain);
    }
}

/// Identity backed by a raw public key (RFC 7250).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPublicKeyIdentity {
    key_algorithm: KeyAlgorithm,
}

impl RawPublicKeyIdentity {
    /// Create an identity from a DER encoded SubjectPublicKeyInfo.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, CertificateError> {
        let spki = SubjectPublicKeyInfoOwned::from_der(der)
            .map_err(|e| CertificateError::InvalidFormat(e.to_string()))?;
        Ok(RawPublicKeyIdentity {
            key_algorithm: key_algorithm_of(&spki)?,
        })
    }

    pub fn key_algorithm(&self) -> KeyAlgorithm {
        self.key_algorithm
    }
}

impl CertificateProvider for RawPublicKeyIdentity {
    fn supported_certificate_types(&self) -> &[CertificateType] {
        RPK_ONLY
    }

    fn configuration_defaults(&self) -> Option<&dyn ConfigurationDefaults> {
        Some(self)
    }
}

impl ConfigurationDefaults for RawPublicKeyIdentity {
    fn setup_configuration_helper(&self, helper: &mut ConfigurationHelper) {
        helper.add_identity_public_key(self.key_algorithm);
    }
}

/// Verifier trusting a fixed set of X.509 certificates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509TrustVerifier {
    trusted: Vec<CertificateInfo>,
}

impl X509TrustVerifier {
    /// Create a verifier from DER encoded trusted certificates.
    pub fn from_der_certificates<I, C>(trusted: I) -> Result<Self, CertificateError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let trusted = trusted
            .into_iter()
            .map(|der| CertificateInfo::from_der(der.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(X509TrustVerifier { trusted })
    }

    pub fn trusted(&self) -> &[CertificateInfo] {
        &self.trusted
    }
}

impl CertificateVerifier for X509TrustVerifier {
    fn supported_certificate_types(&self) -> &[CertificateType] {
        X509_ONLY
    }

    fn configuration_defaults(&self) -> Option<&dyn ConfigurationDefaults> {
        Some(self)
    }
}

impl ConfigurationDefaults for X509TrustVerifier {
    fn setup_configuration_helper(&self, helper: &mut ConfigurationHelper) {
        helper.add_trusted_certificates(&self.trusted);
    }
}
