//! Capabilities the configuration consumes but does not implement.
//!
//! Credential stores, certificate providers and verifiers live outside this crate.
//! The configuration only asks them a few questions while it is finalized. The
//! remaining handles are carried through untouched for the connector runtime.

use std::fmt::Debug;
use std::net::SocketAddr;

use crate::certificate::ConfigurationHelper;
use crate::types::CertificateType;

/// Store of pre-shared keys.
pub trait PskStore: Send + Sync + Debug {
    /// Whether the store can serve ECDHE_PSK handshakes.
    ///
    /// ECDHE_PSK needs the plain PSK secret, which hardware-backed stores may
    /// refuse to hand out.
    fn has_ecdhe_psk_supported(&self) -> bool;
}

/// Provides this connector's own certificate based identity.
pub trait CertificateProvider: Send + Sync + Debug {
    /// Certificate types the identity can be sent as.
    fn supported_certificate_types(&self) -> &[CertificateType];

    /// Optional extended capability supplying certificate specific defaults.
    fn configuration_defaults(&self) -> Option<&dyn ConfigurationDefaults> {
        None
    }
}

/// Verifies the certificate based identity of peers.
pub trait CertificateVerifier: Send + Sync + Debug {
    /// Certificate types the verifier accepts from peers.
    fn supported_certificate_types(&self) -> &[CertificateType];

    /// Optional extended capability supplying certificate specific defaults.
    fn configuration_defaults(&self) -> Option<&dyn ConfigurationDefaults> {
        None
    }
}

/// Extended capability of identities and verifiers.
///
/// Implementors register their key material with the helper, which then
/// knows the key algorithms, signature algorithms and curves the material
/// requires.
pub trait ConfigurationDefaults {
    fn setup_configuration_helper(&self, helper: &mut ConfigurationHelper);
}

/// Decides whether a session may be resumed without further checks.
///
/// Only invoked by the connector runtime.
pub trait ResumptionVerifier: Send + Sync + Debug {
    fn is_resumption_allowed(&self, session_id: &[u8], server_name: Option<&str>) -> bool;
}

/// Creates connection IDs (RFC 9146).
pub trait ConnectionIdGenerator: Send + Sync + Debug {
    /// Whether this generator creates connection IDs for the local peer.
    ///
    /// A generator may only support the extension for the other peer.
    fn uses_connection_id(&self) -> bool;

    fn create_connection_id(&self) -> Vec<u8>;
}

/// Notified about connection lifecycle events by the connector runtime.
pub trait ConnectionListener: Send + Sync + Debug {
    fn on_connection_established(&self, _peer: SocketAddr) {}

    fn on_connection_removed(&self, _peer: SocketAddr) {}
}

/// Receives periodic health statistics.
pub trait DtlsHealth: Send + Sync + Debug {
    /// Whether statistics are currently collected.
    fn is_enabled(&self) -> bool;

    fn dump(&self, tag: &str, max_connections: usize, remaining_capacity: usize);
}
