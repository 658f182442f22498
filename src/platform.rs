use std::num::NonZeroUsize;
use std::thread;

use crate::crypto::{default_provider, CryptoProvider};

/// Facts about the executing environment the configuration depends on.
///
/// Finalizing a configuration reads the platform, never ambient global state,
/// so tests can pin the core count and crypto provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    available_parallelism: usize,
    crypto_provider: CryptoProvider,
}

impl Platform {
    /// Create a platform with a fixed core count and crypto provider.
    ///
    /// A core count of 0 is treated as 1.
    pub fn new(available_parallelism: usize, crypto_provider: CryptoProvider) -> Self {
        Platform {
            available_parallelism: available_parallelism.max(1),
            crypto_provider,
        }
    }

    /// Read the host once.
    ///
    /// The crypto provider is the one installed via
    /// [`CryptoProvider::install_default()`], or the built-in
    /// [`default_provider()`] if none is installed.
    pub fn detect() -> Self {
        let cores = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let provider = CryptoProvider::get_default()
            .cloned()
            .unwrap_or_else(default_provider);
        Platform::new(cores, provider)
    }

    /// Number of cores available to the process.
    #[inline(always)]
    pub fn available_parallelism(&self) -> usize {
        self.available_parallelism
    }

    #[inline(always)]
    pub fn crypto_provider(&self) -> &CryptoProvider {
        &self.crypto_provider
    }
}
