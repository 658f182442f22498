//! Validation and support queries for crypto providers.

use crate::cipher_suite::CipherSuite;
use crate::crypto::provider::CryptoProvider;
use crate::types::{NamedGroup, SignatureAndHashAlgorithm};
use crate::Error;

impl CryptoProvider {
    /// Returns an iterator over the cipher suites a connector may use.
    ///
    /// The NULL cipher suite is never returned, even if a provider lists it.
    pub fn supported_cipher_suites(&self) -> impl Iterator<Item = CipherSuite> + '_ {
        self.cipher_suites
            .iter()
            .copied()
            .filter(|cs| *cs != CipherSuite::NULL_WITH_NULL_NULL)
    }

    /// Whether the provider implements the given cipher suite.
    pub fn supports_cipher_suite(&self, suite: CipherSuite) -> bool {
        self.supported_cipher_suites().any(|cs| cs == suite)
    }

    /// Whether the provider implements the given group.
    pub fn supports_group(&self, group: NamedGroup) -> bool {
        self.groups.contains(&group)
    }

    /// Whether the provider implements the given signature algorithm.
    pub fn supports_signature_algorithm(&self, algorithm: SignatureAndHashAlgorithm) -> bool {
        self.signature_algorithms.contains(&algorithm)
    }

    /// Check if provider supports ECC based cipher suites.
    pub fn has_ecc(&self) -> bool {
        self.supported_cipher_suites().any(|cs| cs.is_ecc_based())
    }

    /// Validates the provider.
    ///
    /// - At least one usable cipher suite
    /// - ECC cipher suites have groups and signature algorithms to work with
    ///
    /// Returns `Error::Provider` if validation fails.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_cipher_suites()?;
        self.validate_groups()?;
        self.validate_signature_algorithms()?;
        Ok(())
    }

    fn validate_cipher_suites(&self) -> Result<(), Error> {
        if self.supported_cipher_suites().count() == 0 {
            return Err(Error::Provider(
                "CryptoProvider has no usable cipher suites.".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_groups(&self) -> Result<(), Error> {
        if self.has_ecc() && self.groups.is_empty() {
            return Err(Error::Provider(
                "CryptoProvider has ECC cipher suites but no supported groups.".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_signature_algorithms(&self) -> Result<(), Error> {
        let needs_signatures = self
            .supported_cipher_suites()
            .any(|cs| cs.requires_server_certificate());
        if needs_signatures && self.signature_algorithms.is_empty() {
            return Err(Error::Provider(
                "CryptoProvider has certificate based cipher suites but no signature algorithms."
                    .to_string(),
            ));
        }
        Ok(())
    }
}
