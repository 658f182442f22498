//! Crypto provider description.
//!
//! A [`CryptoProvider`] lists the algorithms a crypto backend implements. The
//! configuration consults it when deriving defaults and rejects anything the
//! backend is unable to provide.
//!
//! # Using a Custom Provider
//!
//! ```
//! use dtls_config::crypto::{CipherSuite, CryptoProvider, NamedGroup, SignatureAndHashAlgorithm};
//!
//! static SUITES: &[CipherSuite] = &[CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256];
//! static GROUPS: &[NamedGroup] = &[NamedGroup::Secp256r1];
//! static SIGNATURES: &[SignatureAndHashAlgorithm] = &[SignatureAndHashAlgorithm::SHA256_WITH_ECDSA];
//!
//! let provider = CryptoProvider {
//!     cipher_suites: SUITES,
//!     groups: GROUPS,
//!     signature_algorithms: SIGNATURES,
//! };
//! assert!(provider.validate().is_ok());
//! ```

use std::sync::OnceLock;

use crate::cipher_suite::CipherSuite;
use crate::types::{NamedGroup, SignatureAndHashAlgorithm};

/// Algorithms implemented by a crypto backend.
///
/// The provider uses static slices, so a custom provider is built from
/// `static` lists without allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoProvider {
    /// Supported DTLS 1.2 cipher suites.
    pub cipher_suites: &'static [CipherSuite],

    /// Supported groups for ECDHE and EC keys.
    pub groups: &'static [NamedGroup],

    /// Supported signature and hash algorithms.
    pub signature_algorithms: &'static [SignatureAndHashAlgorithm],
}

/// Static storage for the default crypto provider.
///
/// This is set by `install_default()` and retrieved by `get_default()`.
static DEFAULT: OnceLock<CryptoProvider> = OnceLock::new();

impl CryptoProvider {
    /// Install a default crypto provider for the process.
    ///
    /// [`Platform::detect()`](crate::Platform::detect) picks it up when
    /// a configuration is built without an explicit platform.
    ///
    /// The default can only be set once per process. A second call hands the
    /// rejected provider back as the error.
    pub fn install_default(provider: CryptoProvider) -> Result<(), CryptoProvider> {
        DEFAULT.set(provider)
    }

    /// Get the default crypto provider, if one has been installed.
    pub fn get_default() -> Option<&'static CryptoProvider> {
        DEFAULT.get()
    }
}
