//! DTLS 1.2 cipher suite catalog.
//!
//! Every suite carries the properties the configuration needs to reason about it:
//! its key exchange family, whether the server authenticates with a certificate
//! and with which key algorithm, and whether IANA recommends it.

use std::fmt;
use std::str::FromStr;

use crate::error::OptionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
/// Cipher suites a DTLS 1.2 connector can be configured with.
pub enum CipherSuite {
    /// No protection at all. Never accepted by the configuration.
    NULL_WITH_NULL_NULL, // 0x0000

    // ECDHE with ECDSA certificates
    ECDHE_ECDSA_AES128_GCM_SHA256,    // 0xC02B
    ECDHE_ECDSA_AES256_GCM_SHA384,    // 0xC02C
    ECDHE_ECDSA_CHACHA20_POLY1305,    // 0xCCA9
    ECDHE_ECDSA_AES128_CCM_8,         // 0xC0AE
    ECDHE_ECDSA_AES256_CCM_8,         // 0xC0AF
    ECDHE_ECDSA_AES128_CCM,           // 0xC0AC
    ECDHE_ECDSA_AES256_CCM,           // 0xC0AD
    ECDHE_ECDSA_AES128_CBC_SHA256,    // 0xC023
    ECDHE_ECDSA_AES256_CBC_SHA384,    // 0xC024
    ECDHE_ECDSA_AES256_CBC_SHA,       // 0xC00A

    // ECDHE with RSA certificates
    ECDHE_RSA_AES128_GCM_SHA256,      // 0xC02F
    ECDHE_RSA_AES256_GCM_SHA384,      // 0xC030
    ECDHE_RSA_CHACHA20_POLY1305,      // 0xCCA8
    ECDHE_RSA_AES128_CBC_SHA256,      // 0xC027

    // ECDHE with pre-shared keys
    ECDHE_PSK_AES128_GCM_SHA256,      // 0xD001
    ECDHE_PSK_AES256_GCM_SHA384,      // 0xD002
    ECDHE_PSK_CHACHA20_POLY1305,      // 0xCCAC
    ECDHE_PSK_AES128_CCM_8_SHA256,    // 0xD003
    ECDHE_PSK_AES128_CCM_SHA256,      // 0xD005
    ECDHE_PSK_AES128_CBC_SHA256,      // 0xC037

    // Plain pre-shared keys
    PSK_AES128_GCM_SHA256,            // 0x00A8
    PSK_AES256_GCM_SHA384,            // 0x00A9
    PSK_AES128_CCM_8,                 // 0xC0A8
    PSK_AES256_CCM_8,                 // 0xC0A9
    PSK_AES128_CCM,                   // 0xC0A4
    PSK_AES256_CCM,                   // 0xC0A5
    PSK_AES128_CBC_SHA256,            // 0x00AE

    // Anonymous ECDH, no authentication of either peer
    ECDH_ANON_AES128_CBC_SHA,         // 0xC018
    ECDH_ANON_AES256_CBC_SHA,         // 0xC019
}

/// Key exchange family of a cipher suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum KeyExchangeAlgorithm {
    Null,
    /// Plain pre-shared key.
    Psk,
    /// ECDHE authenticated by a pre-shared key.
    EcdhePsk,
    /// ECDHE authenticated by a certificate.
    Ecdhe,
    /// Anonymous ECDH.
    EcdhAnon,
}

/// Key algorithm the server certificate of a suite must use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateKeyAlgorithm {
    /// EC keys, including EdDSA keys (RFC 8422).
    Ec,
    Rsa,
}

impl CipherSuite {
    /// Return the 16-bit IANA value for this cipher suite.
    pub fn as_u16(&self) -> u16 {
        use CipherSuite::*;
        match self {
            NULL_WITH_NULL_NULL => 0x0000,
            ECDHE_ECDSA_AES128_GCM_SHA256 => 0xC02B,
            ECDHE_ECDSA_AES256_GCM_SHA384 => 0xC02C,
            ECDHE_ECDSA_CHACHA20_POLY1305 => 0xCCA9,
            ECDHE_ECDSA_AES128_CCM_8 => 0xC0AE,
            ECDHE_ECDSA_AES256_CCM_8 => 0xC0AF,
            ECDHE_ECDSA_AES128_CCM => 0xC0AC,
            ECDHE_ECDSA_AES256_CCM => 0xC0AD,
            ECDHE_ECDSA_AES128_CBC_SHA256 => 0xC023,
            ECDHE_ECDSA_AES256_CBC_SHA384 => 0xC024,
            ECDHE_ECDSA_AES256_CBC_SHA => 0xC00A,
            ECDHE_RSA_AES128_GCM_SHA256 => 0xC02F,
            ECDHE_RSA_AES256_GCM_SHA384 => 0xC030,
            ECDHE_RSA_CHACHA20_POLY1305 => 0xCCA8,
            ECDHE_RSA_AES128_CBC_SHA256 => 0xC027,
            ECDHE_PSK_AES128_GCM_SHA256 => 0xD001,
            ECDHE_PSK_AES256_GCM_SHA384 => 0xD002,
            ECDHE_PSK_CHACHA20_POLY1305 => 0xCCAC,
            ECDHE_PSK_AES128_CCM_8_SHA256 => 0xD003,
            ECDHE_PSK_AES128_CCM_SHA256 => 0xD005,
            ECDHE_PSK_AES128_CBC_SHA256 => 0xC037,
            PSK_AES128_GCM_SHA256 => 0x00A8,
            PSK_AES256_GCM_SHA384 => 0x00A9,
            PSK_AES128_CCM_8 => 0xC0A8,
            PSK_AES256_CCM_8 => 0xC0A9,
            PSK_AES128_CCM => 0xC0A4,
            PSK_AES256_CCM => 0xC0A5,
            PSK_AES128_CBC_SHA256 => 0x00AE,
            ECDH_ANON_AES128_CBC_SHA => 0xC018,
            ECDH_ANON_AES256_CBC_SHA => 0xC019,
        }
    }

    /// The IANA name, e.g. "TLS_PSK_WITH_AES_128_CCM_8".
    pub fn name(&self) -> &'static str {
        use CipherSuite::*;
        match self {
            NULL_WITH_NULL_NULL => "TLS_NULL_WITH_NULL_NULL",
            ECDHE_ECDSA_AES128_GCM_SHA256 => "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
            ECDHE_ECDSA_AES256_GCM_SHA384 => "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
            ECDHE_ECDSA_CHACHA20_POLY1305 => "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256",
            ECDHE_ECDSA_AES128_CCM_8 => "TLS_ECDHE_ECDSA_WITH_AES_128_CCM_8",
            ECDHE_ECDSA_AES256_CCM_8 => "TLS_ECDHE_ECDSA_WITH_AES_256_CCM_8",
            ECDHE_ECDSA_AES128_CCM => "TLS_ECDHE_ECDSA_WITH_AES_128_CCM",
            ECDHE_ECDSA_AES256_CCM => "TLS_ECDHE_ECDSA_WITH_AES_256_CCM",
            ECDHE_ECDSA_AES128_CBC_SHA256 => "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256",
            ECDHE_ECDSA_AES256_CBC_SHA384 => "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384",
            ECDHE_ECDSA_AES256_CBC_SHA => "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA",
            ECDHE_RSA_AES128_GCM_SHA256 => "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
            ECDHE_RSA_AES256_GCM_SHA384 => "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
            ECDHE_RSA_CHACHA20_POLY1305 => "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
            ECDHE_RSA_AES128_CBC_SHA256 => "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256",
            ECDHE_PSK_AES128_GCM_SHA256 => "TLS_ECDHE_PSK_WITH_AES_128_GCM_SHA256",
            ECDHE_PSK_AES256_GCM_SHA384 => "TLS_ECDHE_PSK_WITH_AES_256_GCM_SHA384",
            ECDHE_PSK_CHACHA20_POLY1305 => "TLS_ECDHE_PSK_WITH_CHACHA20_POLY1305_SHA256",
            ECDHE_PSK_AES128_CCM_8_SHA256 => "TLS_ECDHE_PSK_WITH_AES_128_CCM_8_SHA256",
            ECDHE_PSK_AES128_CCM_SHA256 => "TLS_ECDHE_PSK_WITH_AES_128_CCM_SHA256",
            ECDHE_PSK_AES128_CBC_SHA256 => "TLS_ECDHE_PSK_WITH_AES_128_CBC_SHA256",
            PSK_AES128_GCM_SHA256 => "TLS_PSK_WITH_AES_128_GCM_SHA256",
            PSK_AES256_GCM_SHA384 => "TLS_PSK_WITH_AES_256_GCM_SHA384",
            PSK_AES128_CCM_8 => "TLS_PSK_WITH_AES_128_CCM_8",
            PSK_AES256_CCM_8 => "TLS_PSK_WITH_AES_256_CCM_8",
            PSK_AES128_CCM => "TLS_PSK_WITH_AES_128_CCM",
            PSK_AES256_CCM => "TLS_PSK_WITH_AES_256_CCM",
            PSK_AES128_CBC_SHA256 => "TLS_PSK_WITH_AES_128_CBC_SHA256",
            ECDH_ANON_AES128_CBC_SHA => "TLS_ECDH_anon_WITH_AES_128_CBC_SHA",
            ECDH_ANON_AES256_CBC_SHA => "TLS_ECDH_anon_WITH_AES_256_CBC_SHA",
        }
    }

    /// The key exchange algorithm family for this cipher suite.
    pub fn key_exchange(&self) -> KeyExchangeAlgorithm {
        use CipherSuite::*;
        match self {
            NULL_WITH_NULL_NULL => KeyExchangeAlgorithm::Null,

            ECDHE_ECDSA_AES128_GCM_SHA256
            | ECDHE_ECDSA_AES256_GCM_SHA384
            | ECDHE_ECDSA_CHACHA20_POLY1305
            | ECDHE_ECDSA_AES128_CCM_8
            | ECDHE_ECDSA_AES256_CCM_8
            | ECDHE_ECDSA_AES128_CCM
            | ECDHE_ECDSA_AES256_CCM
            | ECDHE_ECDSA_AES128_CBC_SHA256
            | ECDHE_ECDSA_AES256_CBC_SHA384
            | ECDHE_ECDSA_AES256_CBC_SHA
            | ECDHE_RSA_AES128_GCM_SHA256
            | ECDHE_RSA_AES256_GCM_SHA384
            | ECDHE_RSA_CHACHA20_POLY1305
            | ECDHE_RSA_AES128_CBC_SHA256 => KeyExchangeAlgorithm::Ecdhe,

            ECDHE_PSK_AES128_GCM_SHA256
            | ECDHE_PSK_AES256_GCM_SHA384
            | ECDHE_PSK_CHACHA20_POLY1305
            | ECDHE_PSK_AES128_CCM_8_SHA256
            | ECDHE_PSK_AES128_CCM_SHA256
            | ECDHE_PSK_AES128_CBC_SHA256 => KeyExchangeAlgorithm::EcdhePsk,

            PSK_AES128_GCM_SHA256
            | PSK_AES256_GCM_SHA384
            | PSK_AES128_CCM_8
            | PSK_AES256_CCM_8
            | PSK_AES128_CCM
            | PSK_AES256_CCM
            | PSK_AES128_CBC_SHA256 => KeyExchangeAlgorithm::Psk,

            ECDH_ANON_AES128_CBC_SHA | ECDH_ANON_AES256_CBC_SHA => KeyExchangeAlgorithm::EcdhAnon,
        }
    }

    /// Key algorithm of the server certificate, `None` if the suite uses no certificate.
    pub fn certificate_key_algorithm(&self) -> Option<CertificateKeyAlgorithm> {
        use CipherSuite::*;
        match self {
            ECDHE_RSA_AES128_GCM_SHA256
            | ECDHE_RSA_AES256_GCM_SHA384
            | ECDHE_RSA_CHACHA20_POLY1305
            | ECDHE_RSA_AES128_CBC_SHA256 => Some(CertificateKeyAlgorithm::Rsa),
            _ if self.key_exchange() == KeyExchangeAlgorithm::Ecdhe => {
                Some(CertificateKeyAlgorithm::Ec)
            }
            _ => None,
        }
    }

    /// Whether the suite authenticates with a pre-shared key.
    pub fn is_psk_based(&self) -> bool {
        matches!(
            self.key_exchange(),
            KeyExchangeAlgorithm::Psk | KeyExchangeAlgorithm::EcdhePsk
        )
    }

    /// Whether the suite uses elliptic curves (and therefore groups and signatures).
    pub fn is_ecc_based(&self) -> bool {
        matches!(
            self.key_exchange(),
            KeyExchangeAlgorithm::Ecdhe
                | KeyExchangeAlgorithm::EcdhePsk
                | KeyExchangeAlgorithm::EcdhAnon
        )
    }

    /// Whether the server sends a Certificate message for this suite.
    pub fn requires_server_certificate(&self) -> bool {
        self.certificate_key_algorithm().is_some()
    }

    /// Whether the suite is recommended.
    ///
    /// Only authenticated AEAD suites are.
    pub fn is_recommended(&self) -> bool {
        use CipherSuite::*;
        match self {
            NULL_WITH_NULL_NULL
            | ECDHE_ECDSA_AES128_CBC_SHA256
            | ECDHE_ECDSA_AES256_CBC_SHA384
            | ECDHE_ECDSA_AES256_CBC_SHA
            | ECDHE_RSA_AES128_CBC_SHA256
            | ECDHE_PSK_AES128_CBC_SHA256
            | PSK_AES128_CBC_SHA256
            | ECDH_ANON_AES128_CBC_SHA
            | ECDH_ANON_AES256_CBC_SHA => false,
            _ => true,
        }
    }

    /// All cipher suites in preference order.
    pub const fn all() -> &'static [CipherSuite; 30] {
        use CipherSuite::*;
        &[
            ECDHE_ECDSA_AES128_GCM_SHA256,
            ECDHE_ECDSA_AES256_GCM_SHA384,
            ECDHE_ECDSA_CHACHA20_POLY1305,
            ECDHE_ECDSA_AES128_CCM_8,
            ECDHE_ECDSA_AES256_CCM_8,
            ECDHE_ECDSA_AES128_CCM,
            ECDHE_ECDSA_AES256_CCM,
            ECDHE_ECDSA_AES128_CBC_SHA256,
            ECDHE_ECDSA_AES256_CBC_SHA384,
            ECDHE_ECDSA_AES256_CBC_SHA,
            ECDHE_RSA_AES128_GCM_SHA256,
            ECDHE_RSA_AES256_GCM_SHA384,
            ECDHE_RSA_CHACHA20_POLY1305,
            ECDHE_RSA_AES128_CBC_SHA256,
            ECDHE_PSK_AES128_GCM_SHA256,
            ECDHE_PSK_AES256_GCM_SHA384,
            ECDHE_PSK_CHACHA20_POLY1305,
            ECDHE_PSK_AES128_CCM_8_SHA256,
            ECDHE_PSK_AES128_CCM_SHA256,
            ECDHE_PSK_AES128_CBC_SHA256,
            PSK_AES128_GCM_SHA256,
            PSK_AES256_GCM_SHA384,
            PSK_AES128_CCM_8,
            PSK_AES256_CCM_8,
            PSK_AES128_CCM,
            PSK_AES256_CCM,
            PSK_AES128_CBC_SHA256,
            ECDH_ANON_AES128_CBC_SHA,
            ECDH_ANON_AES256_CBC_SHA,
            NULL_WITH_NULL_NULL,
        ]
    }

    /// All cipher suites a connector may use, NULL excluded.
    pub fn supported() -> &'static [CipherSuite] {
        let all = Self::all();
        // NULL is last in the catalog
        &all[..all.len() - 1]
    }

    /// Suites of one key exchange family in preference order, optionally only recommended ones.
    pub fn by_key_exchange(
        kx: KeyExchangeAlgorithm,
        recommended_only: bool,
    ) -> impl Iterator<Item = CipherSuite> {
        Self::all()
            .iter()
            .copied()
            .filter(move |cs| cs.key_exchange() == kx)
            .filter(move |cs| !recommended_only || cs.is_recommended())
    }

    /// Certificate based suites for one certificate key algorithm.
    pub fn by_certificate_key_algorithm(
        algorithm: CertificateKeyAlgorithm,
        recommended_only: bool,
    ) -> impl Iterator<Item = CipherSuite> {
        Self::by_key_exchange(KeyExchangeAlgorithm::Ecdhe, recommended_only)
            .filter(move |cs| cs.certificate_key_algorithm() == Some(algorithm))
    }
}

/// Whether any of the suites is PSK based.
pub fn contains_psk_based(suites: &[CipherSuite]) -> bool {
    suites.iter().any(|cs| cs.is_psk_based())
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSuite {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CipherSuite::all()
            .iter()
            .copied()
            .find(|cs| cs.name() == s)
            .ok_or_else(|| OptionError::UnknownName {
                kind: "cipher suite",
                name: s.to_string(),
            })
    }
}
