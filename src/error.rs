use thiserror::Error;

use crate::certificate::CertificateError;
use crate::cipher_suite::{CertificateKeyAlgorithm, CipherSuite};
use crate::types::{KeyAlgorithm, NamedGroup, ProtocolVersion, SignatureAndHashAlgorithm};

/// Errors produced while configuring a DTLS connector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A single option was rejected when it was set.
    #[error(transparent)]
    Option(#[from] OptionError),

    /// The collected options are individually valid but not consistent.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// Certificate material could not be introspected.
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// The crypto provider failed its self-validation.
    #[error("invalid crypto provider: {0}")]
    Provider(String),
}

/// Authoring errors, raised by the option setters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("{option} must be within {expected}, not {value}")]
    OutOfRange {
        option: &'static str,
        value: u64,
        expected: &'static str,
    },

    #[error("{0} must contain at least one entry")]
    EmptyList(&'static str),

    #[error("NULL cipher suite is not supported by the connector")]
    NullCipherSuite,

    #[error("{kind} '{name}' is not supported")]
    UnknownName { kind: &'static str, name: String },

    #[error("not recommended {kind} {names} used (requires relaxing the recommended-only gate)")]
    NotRecommended { kind: &'static str, names: String },

    #[error("protocol version {0:?} can not be used for HELLO_VERIFY_REQUEST")]
    UnsupportedProtocolVersion(ProtocolVersion),

    #[error("{option} is in contradiction to {conflicting}")]
    Conflict {
        option: &'static str,
        conflicting: &'static str,
    },

    #[error("HELLO_VERIFY_REQUEST disabled for PSK requires at least one PSK cipher suite")]
    NoPskCipherSuite,
}

/// Which side of the connection an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// Consistency errors, raised only when the configuration is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("client only is in contradiction to server only")]
    ClientAndServerOnly,

    #[error("{option} is not applicable to a {role:?}-only connector")]
    RoleExclusiveOption { option: &'static str, role: Role },

    #[error("default handshake mode 'auto' is not supported for server only")]
    HandshakeModeForServerOnly,

    #[error(
        "no usable cipher suite, set them explicitly or implicitly by configuring \
         a certificate identity, certificate verifier or PSK store"
    )]
    NoCipherSuites,

    #[error("cipher suite {0} is not supported by the crypto provider")]
    UnsupportedCipherSuite(CipherSuite),

    #[error("supported group {0} is not supported by the crypto provider")]
    UnsupportedGroup(NamedGroup),

    #[error("signature algorithm {0} is not supported by the crypto provider")]
    UnsupportedSignatureAlgorithm(SignatureAndHashAlgorithm),

    #[error("not recommended {kind} {names} used (requires relaxing the recommended-only gate)")]
    NotRecommended { kind: &'static str, names: String },

    #[error("neither PSK nor certificate based cipher suites, only legal for client only")]
    NoCredentials,

    #[error("PSK store must be set for {0}")]
    MissingPskStore(CipherSuite),

    #[error("PSK store doesn't support ECDHE, required by {0}")]
    PskStoreWithoutEcdhe(CipherSuite),

    #[error("certificate identity must be set for {0}")]
    MissingCertificateIdentity(CipherSuite),

    #[error("certificate verifier must be set for {0}")]
    MissingCertificateVerifier(CipherSuite),

    #[error("keys must be {algorithm:?} capable for {suite}")]
    IncompatibleKeyAlgorithm {
        suite: CipherSuite,
        algorithm: CertificateKeyAlgorithm,
    },

    #[error("PSK store set, but no PSK cipher suite")]
    UnusedPskStore,

    #[error("certificate identity set, but no certificate based cipher suite")]
    UnusedCertificateIdentity,

    #[error("certificate verifier set, but no certificate based cipher suite")]
    UnusedCertificateVerifier,

    #[error("certificate verifier is not used for disabled client authentication")]
    VerifierWithoutClientAuthentication,

    #[error("supported signature algorithms set, but no ECC based cipher suite")]
    SignatureAlgorithmsWithoutEcc,

    #[error("supported groups set, but no ECC based cipher suite")]
    SupportedGroupsWithoutEcc,

    #[error("ECC based cipher suites, but no usable signature algorithm")]
    NoSignatureAlgorithms,

    #[error("ECC based cipher suites, but no usable supported group")]
    NoSupportedGroups,

    #[error("no supported signature algorithm for {0:?} keys")]
    KeyWithoutSignatureAlgorithm(KeyAlgorithm),

    #[error("curve {0} of a certificate key is not a supported group")]
    CurveNotSupported(NamedGroup),

    #[error("certificate chain is signed with {0}, which is not a supported signature algorithm")]
    CertificateSignatureNotSupported(SignatureAndHashAlgorithm),

    #[error("HELLO_VERIFY_REQUEST is generally disabled, but enabled for PSK")]
    HelloVerifyRequestForPskEnabled,

    #[error("verify peers on resumption threshold set, but HELLO_VERIFY_REQUEST is disabled")]
    ResumptionThresholdWithoutHelloVerifyRequest,

    #[error("HELLO_VERIFY_REQUEST disabled for PSK, requires at least one PSK cipher suite")]
    HelloVerifyRequestForPskWithoutPskSuite,

    #[error("anti replay filter and extended window filter are mutually exclusive")]
    AntiReplayWithExtendedWindow,

    #[error("certificate has no proper key usage for {0:?} authentication")]
    KeyUsage(Role),
}
