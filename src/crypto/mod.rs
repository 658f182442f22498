//! What the executing environment can do cryptographically.
//!
//! The configuration never encrypts or signs anything itself. It only needs to know
//! which cipher suites, groups and signature algorithms the runtime's crypto backend
//! is able to provide, so that it never hands out a configuration the runtime
//! can't honor.

mod builtin;
pub mod provider;
mod validation;

pub use builtin::default_provider;
pub use provider::CryptoProvider;

// Re-export the algorithm identifiers a provider is described with.
pub use crate::cipher_suite::CipherSuite;
pub use crate::types::{NamedGroup, SignatureAndHashAlgorithm};
