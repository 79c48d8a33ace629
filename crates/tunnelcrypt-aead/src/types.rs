//! Fixed-size nonce and tag values.
//!
//! Both supported families use a 96-bit nonce and a 128-bit tag. These are
//! protocol constants, so they are carried as arrays and never as
//! per-call lengths.

use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;

/// Nonce size (12 bytes / 96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (16 bytes / 128 bits).
pub const TAG_SIZE: usize = 16;

/// Largest key any supported algorithm consumes.
pub const MAX_KEY_SIZE: usize = 32;

/// AEAD nonce (12 bytes).
///
/// Must never repeat under the same key. The tunnel derives it from the
/// packet counter, see [`Nonce::from_counter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Create a nonce from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a nonce from a slice.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; NONCE_SIZE] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Generate a random nonce.
    #[must_use]
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Build a nonce from a packet counter.
    ///
    /// Layout is the 4-byte implicit salt followed by the counter as
    /// 8 big-endian bytes.
    #[must_use]
    pub fn from_counter(counter: u64, salt: &[u8; 4]) -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        bytes[..4].copy_from_slice(salt);
        bytes[4..].copy_from_slice(&counter.to_be_bytes());
        Self(bytes)
    }

    /// Get raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// Authentication tag (16 bytes).
///
/// Comparison runs in constant time.
#[derive(Clone, Copy, Debug)]
pub struct Tag([u8; TAG_SIZE]);

impl Tag {
    /// Create a tag from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; TAG_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from slice.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; TAG_SIZE] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Get raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; TAG_SIZE] {
        &self.0
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Tag {}
