use crate::cipher_suite::CipherSuite;
use crate::crypto::CryptoProvider;
use crate::types::{NamedGroup, SignatureAndHashAlgorithm};

/// Provider describing everything the built-in catalog knows, except NULL.
pub fn default_provider() -> CryptoProvider {
    CryptoProvider {
        cipher_suites: CipherSuite::supported(),
        groups: NamedGroup::all(),
        signature_algorithms: SignatureAndHashAlgorithm::all(),
    }
}
