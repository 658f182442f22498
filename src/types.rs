//! Algorithm and protocol identifiers used by the connector configuration.
//!
//! These mirror the registries of RFC 5246, RFC 8422 and RFC 8446, restricted
//! to the entries a DTLS 1.2 connector can be configured with.

use std::fmt;
use std::str::FromStr;

use crate::error::OptionError;

// ============================================================================
// Named Groups (Key Exchange)
// ============================================================================

/// Elliptic curves and key exchange groups (RFC 8422, RFC 8446).
///
/// Used for ECDHE key exchange and to describe the curve of EC certificate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedGroup {
    /// secp256k1 (not recommended).
    Secp256k1,
    /// secp256r1 / P-256.
    Secp256r1,
    /// secp384r1 / P-384.
    Secp384r1,
    /// secp521r1 / P-521.
    Secp521r1,
    /// brainpoolP256r1 (not recommended).
    BrainpoolP256r1,
    /// brainpoolP384r1 (not recommended).
    BrainpoolP384r1,
    /// brainpoolP512r1 (not recommended).
    BrainpoolP512r1,
    /// X25519 (Curve25519 for ECDHE).
    X25519,
    /// X448 (Curve448 for ECDHE).
    X448,
}

impl NamedGroup {
    /// The IANA registry value.
    pub fn as_u16(&self) -> u16 {
        match self {
            NamedGroup::Secp256k1 => 22,
            NamedGroup::Secp256r1 => 23,
            NamedGroup::Secp384r1 => 24,
            NamedGroup::Secp521r1 => 25,
            NamedGroup::BrainpoolP256r1 => 26,
            NamedGroup::BrainpoolP384r1 => 27,
            NamedGroup::BrainpoolP512r1 => 28,
            NamedGroup::X25519 => 29,
            NamedGroup::X448 => 30,
        }
    }

    /// Registry name, e.g. "secp256r1".
    pub fn name(&self) -> &'static str {
        match self {
            NamedGroup::Secp256k1 => "secp256k1",
            NamedGroup::Secp256r1 => "secp256r1",
            NamedGroup::Secp384r1 => "secp384r1",
            NamedGroup::Secp521r1 => "secp521r1",
            NamedGroup::BrainpoolP256r1 => "brainpoolP256r1",
            NamedGroup::BrainpoolP384r1 => "brainpoolP384r1",
            NamedGroup::BrainpoolP512r1 => "brainpoolP512r1",
            NamedGroup::X25519 => "X25519",
            NamedGroup::X448 => "X448",
        }
    }

    /// Whether the IANA registry marks this group as recommended.
    pub fn is_recommended(&self) -> bool {
        matches!(
            self,
            NamedGroup::Secp256r1
                | NamedGroup::Secp384r1
                | NamedGroup::Secp521r1
                | NamedGroup::X25519
                | NamedGroup::X448
        )
    }

    /// All known named groups.
    pub const fn all() -> &'static [NamedGroup; 9] {
        &[
            NamedGroup::Secp256k1,
            NamedGroup::Secp256r1,
            NamedGroup::Secp384r1,
            NamedGroup::Secp521r1,
            NamedGroup::BrainpoolP256r1,
            NamedGroup::BrainpoolP384r1,
            NamedGroup::BrainpoolP512r1,
            NamedGroup::X25519,
            NamedGroup::X448,
        ]
    }

    /// Groups used when no groups are configured, in preference order.
    pub const fn preferred() -> &'static [NamedGroup; 3] {
        &[
            NamedGroup::X25519,
            NamedGroup::Secp256r1,
            NamedGroup::Secp384r1,
        ]
    }
}

impl fmt::Display for NamedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedGroup {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedGroup::all()
            .iter()
            .copied()
            .find(|g| g.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| OptionError::UnknownName {
                kind: "group (curve)",
                name: s.to_string(),
            })
    }
}

// ============================================================================
// Hash Algorithms
// ============================================================================

/// Hash algorithms of TLS 1.2 signature_algorithms (RFC 5246, RFC 8422).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum HashAlgorithm {
    /// No hash (not typically used).
    None,
    /// MD5 hash (deprecated).
    MD5,
    /// SHA-1 hash (deprecated).
    SHA1,
    /// SHA-224 hash.
    SHA224,
    /// SHA-256 hash.
    SHA256,
    /// SHA-384 hash.
    SHA384,
    /// SHA-512 hash.
    SHA512,
    /// The signature algorithm hashes by itself (EdDSA).
    Intrinsic,
}

impl HashAlgorithm {
    /// Convert this `HashAlgorithm` to its wire format u8 value.
    pub fn as_u8(&self) -> u8 {
        match self {
            HashAlgorithm::None => 0,
            HashAlgorithm::MD5 => 1,
            HashAlgorithm::SHA1 => 2,
            HashAlgorithm::SHA224 => 3,
            HashAlgorithm::SHA256 => 4,
            HashAlgorithm::SHA384 => 5,
            HashAlgorithm::SHA512 => 6,
            HashAlgorithm::Intrinsic => 8,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::None => "NONE",
            HashAlgorithm::MD5 => "MD5",
            HashAlgorithm::SHA1 => "SHA1",
            HashAlgorithm::SHA224 => "SHA224",
            HashAlgorithm::SHA256 => "SHA256",
            HashAlgorithm::SHA384 => "SHA384",
            HashAlgorithm::SHA512 => "SHA512",
            HashAlgorithm::Intrinsic => "INTRINSIC",
        }
    }

    fn is_recommended(&self) -> bool {
        matches!(
            self,
            HashAlgorithm::SHA256
                | HashAlgorithm::SHA384
                | HashAlgorithm::SHA512
                | HashAlgorithm::Intrinsic
        )
    }
}

// ============================================================================
// Signature Algorithms
// ============================================================================

/// Signature algorithms of TLS 1.2 signature_algorithms (RFC 5246, RFC 8422).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum SignatureAlgorithm {
    /// Anonymous (no certificate).
    Anonymous,
    /// RSA signatures.
    RSA,
    /// DSA signatures.
    DSA,
    /// ECDSA signatures.
    ECDSA,
    /// Ed25519 signatures.
    ED25519,
    /// Ed448 signatures.
    ED448,
}

impl SignatureAlgorithm {
    /// Convert this `SignatureAlgorithm` into its 8-bit representation.
    pub fn as_u8(&self) -> u8 {
        match self {
            SignatureAlgorithm::Anonymous => 0,
            SignatureAlgorithm::RSA => 1,
            SignatureAlgorithm::DSA => 2,
            SignatureAlgorithm::ECDSA => 3,
            SignatureAlgorithm::ED25519 => 7,
            SignatureAlgorithm::ED448 => 8,
        }
    }

    /// Whether keys of the given algorithm can produce this kind of signature.
    pub fn is_usable_with(&self, key: KeyAlgorithm) -> bool {
        matches!(
            (self, key),
            (SignatureAlgorithm::ECDSA, KeyAlgorithm::Ec(_))
                | (SignatureAlgorithm::RSA, KeyAlgorithm::Rsa)
                | (SignatureAlgorithm::ED25519, KeyAlgorithm::Ed25519)
                | (SignatureAlgorithm::ED448, KeyAlgorithm::Ed448)
        )
    }
}

/// A TLS 1.2 `SignatureAndHashAlgorithm` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureAndHashAlgorithm {
    pub hash: HashAlgorithm,
    pub signature: SignatureAlgorithm,
}

impl SignatureAndHashAlgorithm {
    pub const SHA256_WITH_ECDSA: Self = Self::new(HashAlgorithm::SHA256, SignatureAlgorithm::ECDSA);
    pub const SHA384_WITH_ECDSA: Self = Self::new(HashAlgorithm::SHA384, SignatureAlgorithm::ECDSA);
    pub const SHA512_WITH_ECDSA: Self = Self::new(HashAlgorithm::SHA512, SignatureAlgorithm::ECDSA);
    pub const SHA256_WITH_RSA: Self = Self::new(HashAlgorithm::SHA256, SignatureAlgorithm::RSA);
    pub const SHA384_WITH_RSA: Self = Self::new(HashAlgorithm::SHA384, SignatureAlgorithm::RSA);
    pub const SHA512_WITH_RSA: Self = Self::new(HashAlgorithm::SHA512, SignatureAlgorithm::RSA);
    pub const SHA1_WITH_ECDSA: Self = Self::new(HashAlgorithm::SHA1, SignatureAlgorithm::ECDSA);
    pub const SHA1_WITH_RSA: Self = Self::new(HashAlgorithm::SHA1, SignatureAlgorithm::RSA);
    pub const ED25519: Self = Self::new(HashAlgorithm::Intrinsic, SignatureAlgorithm::ED25519);
    pub const ED448: Self = Self::new(HashAlgorithm::Intrinsic, SignatureAlgorithm::ED448);

    pub const fn new(hash: HashAlgorithm, signature: SignatureAlgorithm) -> Self {
        SignatureAndHashAlgorithm { hash, signature }
    }

    pub fn as_u16(&self) -> u16 {
        ((self.hash.as_u8() as u16) << 8) | (self.signature.as_u8() as u16)
    }

    /// Whether this combination is recommended.
    ///
    /// MD5, SHA-1 and SHA-224 hashes, DSA and anonymous signatures are not.
    pub fn is_recommended(&self) -> bool {
        match self.signature {
            SignatureAlgorithm::ECDSA | SignatureAlgorithm::RSA => {
                self.hash != HashAlgorithm::Intrinsic && self.hash.is_recommended()
            }
            SignatureAlgorithm::ED25519 | SignatureAlgorithm::ED448 => {
                self.hash == HashAlgorithm::Intrinsic
            }
            SignatureAlgorithm::Anonymous | SignatureAlgorithm::DSA => false,
        }
    }

    /// All combinations known to the configuration.
    pub const fn all() -> &'static [SignatureAndHashAlgorithm; 10] {
        &[
            Self::SHA256_WITH_ECDSA,
            Self::SHA384_WITH_ECDSA,
            Self::SHA512_WITH_ECDSA,
            Self::SHA256_WITH_RSA,
            Self::SHA384_WITH_RSA,
            Self::SHA512_WITH_RSA,
            Self::ED25519,
            Self::ED448,
            Self::SHA1_WITH_ECDSA,
            Self::SHA1_WITH_RSA,
        ]
    }

    /// Signature algorithms used when none are configured.
    pub const fn defaults() -> &'static [SignatureAndHashAlgorithm; 2] {
        &[Self::SHA256_WITH_ECDSA, Self::SHA256_WITH_RSA]
    }
}

impl fmt::Display for SignatureAndHashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signature {
            SignatureAlgorithm::ED25519 if self.hash == HashAlgorithm::Intrinsic => {
                f.write_str("ED25519")
            }
            SignatureAlgorithm::ED448 if self.hash == HashAlgorithm::Intrinsic => {
                f.write_str("ED448")
            }
            sig => write!(f, "{}with{:?}", self.hash.name(), sig),
        }
    }
}

impl FromStr for SignatureAndHashAlgorithm {
    type Err = OptionError;

    /// Parses JCA style names such as "SHA256withECDSA" or "ED25519".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignatureAndHashAlgorithm::all()
            .iter()
            .copied()
            .find(|a| a.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| OptionError::UnknownName {
                kind: "signature and hash algorithm",
                name: s.to_string(),
            })
    }
}

// ============================================================================
// Keys and certificates
// ============================================================================

/// Public key algorithm of a certificate or raw public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// EC key on the given curve.
    Ec(NamedGroup),
    Rsa,
    Ed25519,
    Ed448,
}

impl KeyAlgorithm {
    /// Signature algorithm used by default for keys of this algorithm.
    pub fn default_signature_algorithm(&self) -> SignatureAndHashAlgorithm {
        match self {
            KeyAlgorithm::Ec(NamedGroup::Secp384r1) => SignatureAndHashAlgorithm::SHA384_WITH_ECDSA,
            KeyAlgorithm::Ec(NamedGroup::Secp521r1) => SignatureAndHashAlgorithm::SHA512_WITH_ECDSA,
            KeyAlgorithm::Ec(_) => SignatureAndHashAlgorithm::SHA256_WITH_ECDSA,
            KeyAlgorithm::Rsa => SignatureAndHashAlgorithm::SHA256_WITH_RSA,
            KeyAlgorithm::Ed25519 => SignatureAndHashAlgorithm::ED25519,
            KeyAlgorithm::Ed448 => SignatureAndHashAlgorithm::ED448,
        }
    }
}

/// Certificate types (RFC 7250).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateType {
    X509,
    RawPublicKey,
}

// ============================================================================
// Protocol
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    DTLS1_0,
    DTLS1_2,
    DTLS1_3,
    Unknown(u16),
}

impl ProtocolVersion {
    pub fn as_u16(&self) -> u16 {
        match self {
            ProtocolVersion::DTLS1_0 => 0xFEFF,
            ProtocolVersion::DTLS1_2 => 0xFEFD,
            ProtocolVersion::DTLS1_3 => 0xFEFC,
            ProtocolVersion::Unknown(value) => *value,
        }
    }
}

/// Use of the Extended Master Secret extension (RFC 7627).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedMasterSecretMode {
    /// Neither offered nor accepted.
    None,
    /// Offered and accepted, sessions without it are still resumable.
    Optional,
    /// Offered and accepted, sessions without it are not resumable.
    Enabled,
    /// Handshakes without the extension fail.
    Required,
}

/// Whether sending application data starts a handshake automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeMode {
    Auto,
    None,
}
