//! Algorithm resolution.
//!
//! Maps the tunnel's cipher identifiers onto the AEAD families this crate
//! can key, together with the key length each one needs. The mapping is
//! pure and stateless.

use crate::error::AeadError;
use std::fmt;

/// Cipher identifier as negotiated by the tunnel.
///
/// Covers the whole cipher table, including the non-AEAD modes that a peer
/// may still offer during negotiation. Only the GCM variants and
/// ChaCha20-Poly1305 resolve to an AEAD family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    /// No cipher
    None,
    /// AES-128 in CBC mode
    Aes128Cbc,
    /// AES-192 in CBC mode
    Aes192Cbc,
    /// AES-256 in CBC mode
    Aes256Cbc,
    /// Triple-DES in CBC mode
    DesEde3Cbc,
    /// Blowfish in CBC mode
    BfCbc,
    /// AES-128-GCM
    Aes128Gcm,
    /// AES-192-GCM
    Aes192Gcm,
    /// AES-256-GCM
    Aes256Gcm,
    /// ChaCha20-Poly1305 (RFC 8439)
    ChaCha20Poly1305,
}

impl AlgorithmId {
    /// Every identifier, in table order.
    pub const ALL: [AlgorithmId; 10] = [
        AlgorithmId::None,
        AlgorithmId::Aes128Cbc,
        AlgorithmId::Aes192Cbc,
        AlgorithmId::Aes256Cbc,
        AlgorithmId::DesEde3Cbc,
        AlgorithmId::BfCbc,
        AlgorithmId::Aes128Gcm,
        AlgorithmId::Aes192Gcm,
        AlgorithmId::Aes256Gcm,
        AlgorithmId::ChaCha20Poly1305,
    ];

    /// Canonical display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AlgorithmId::None => "none",
            AlgorithmId::Aes128Cbc => "AES-128-CBC",
            AlgorithmId::Aes192Cbc => "AES-192-CBC",
            AlgorithmId::Aes256Cbc => "AES-256-CBC",
            AlgorithmId::DesEde3Cbc => "DES-EDE3-CBC",
            AlgorithmId::BfCbc => "BF-CBC",
            AlgorithmId::Aes128Gcm => "AES-128-GCM",
            AlgorithmId::Aes192Gcm => "AES-192-GCM",
            AlgorithmId::Aes256Gcm => "AES-256-GCM",
            AlgorithmId::ChaCha20Poly1305 => "CHACHA20-POLY1305",
        }
    }

    /// Whether this identifier can be keyed by an [`AeadContext`](crate::AeadContext).
    #[must_use]
    pub const fn is_aead_supported(self) -> bool {
        is_supported(self)
    }

    /// Required key length in bytes, if supported.
    #[must_use]
    pub fn key_size(self) -> Option<usize> {
        match resolve(self) {
            Ok(resolution) => Some(resolution.key_size),
            Err(_) => None,
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Native primitive family backing an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherFamily {
    /// AES block cipher in Galois/Counter Mode
    AesGcm,
    /// ChaCha20 stream cipher with Poly1305 authenticator
    ChaChaPoly,
}

/// Result of resolving a supported algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Primitive family to key
    pub family: CipherFamily,
    /// Key bytes the family consumes
    pub key_size: usize,
}

/// Resolve an identifier to its AEAD family and key length.
///
/// # Errors
///
/// Returns [`AeadError::UnsupportedAlgorithm`] for identifiers outside
/// {AES-128-GCM, AES-192-GCM, AES-256-GCM, ChaCha20-Poly1305}.
pub fn resolve(algorithm: AlgorithmId) -> Result<Resolution, AeadError> {
    let (family, key_size) = match algorithm {
        AlgorithmId::Aes128Gcm => (CipherFamily::AesGcm, 16),
        AlgorithmId::Aes192Gcm => (CipherFamily::AesGcm, 24),
        AlgorithmId::Aes256Gcm => (CipherFamily::AesGcm, 32),
        AlgorithmId::ChaCha20Poly1305 => (CipherFamily::ChaChaPoly, 32),
        other => return Err(AeadError::UnsupportedAlgorithm(other)),
    };
    Ok(Resolution { family, key_size })
}

/// Non-failing capability probe used during cipher negotiation.
#[must_use]
pub const fn is_supported(algorithm: AlgorithmId) -> bool {
    matches!(
        algorithm,
        AlgorithmId::Aes128Gcm
            | AlgorithmId::Aes192Gcm
            | AlgorithmId::Aes256Gcm
            | AlgorithmId::ChaCha20Poly1305
    )
}
