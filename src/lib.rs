//! Configuration of a DTLS connector.
//!
//! Options are collected with a [`ConfigBuilder`], which only rejects values
//! that are wrong on their own. [`ConfigBuilder::build()`] then fills in
//! defaults, derives cipher suites, signature algorithms and groups from the
//! configured credentials, and checks that everything fits together. The
//! result is an immutable [`Config`] to share with the connector runtime.
//!
//! ```
//! use std::sync::Arc;
//! use dtls_config::capability::PskStore;
//! use dtls_config::{Config, CipherSuite};
//!
//! #[derive(Debug)]
//! struct Keys;
//!
//! impl PskStore for Keys {
//!     fn has_ecdhe_psk_supported(&self) -> bool {
//!         false
//!     }
//! }
//!
//! let config = Config::builder()
//!     .psk_store(Arc::new(Keys))
//!     .max_connections(1000)?
//!     .build()?;
//!
//! assert!(config.capabilities().has_psk);
//! assert!(config.cipher_suites().contains(&CipherSuite::PSK_AES128_CCM_8));
//! assert!(config.signature_algorithms().is_empty());
//! # Ok::<(), dtls_config::Error>(())
//! ```
#![forbid(unsafe_code)]
#![warn(clippy::all)]
// #![deny(missing_docs)]

#[macro_use]
extern crate log;

mod builder;
pub use builder::{ConfigBuilder, RawOptions};

mod config;
pub use config::{Capabilities, Config};
pub use config::{
    CONNECTION_THREADS_PER_CORE, DEFAULT_ADDITIONAL_TIMEOUT_FOR_ECC, DEFAULT_ADDRESS,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_DEFERRED_INCOMING_RECORDS_SIZE,
    DEFAULT_MAX_DEFERRED_OUTGOING_APPLICATION_DATA_MESSAGES,
    DEFAULT_MAX_FRAGMENTED_HANDSHAKE_MESSAGE_LENGTH, DEFAULT_MAX_RETRANSMISSIONS,
    DEFAULT_MAX_TRANSMISSION_UNIT_LIMIT, DEFAULT_OUTBOUND_MESSAGE_BUFFER_SIZE,
    DEFAULT_RETRANSMISSION_TIMEOUT, DEFAULT_STALE_CONNECTION_THRESHOLD,
    DEFAULT_VERIFY_PEERS_ON_RESUMPTION_THRESHOLD,
};

mod finalize;
pub use finalize::finalize;

mod error;
pub use error::{ConsistencyError, Error, OptionError, Role};

mod cipher_suite;
pub use cipher_suite::{CertificateKeyAlgorithm, CipherSuite, KeyExchangeAlgorithm};

mod types;
pub use types::{
    CertificateType, ExtendedMasterSecretMode, HandshakeMode, HashAlgorithm, KeyAlgorithm,
    NamedGroup, ProtocolVersion, SignatureAlgorithm, SignatureAndHashAlgorithm,
};

mod platform;
pub use platform::Platform;

pub mod capability;
pub mod certificate;
pub mod crypto;
