//! Keyed AEAD context.
//!
//! An [`AeadContext`] owns at most one keyed primitive. The primitive is an
//! enum over the supported families, so the algorithm reported by the
//! context is always the one that will run, and nothing can read the state
//! of a family that was never keyed.
//!
//! ## Error model
//!
//! - Setup and call-contract problems (unsupported algorithm, short key,
//!   unkeyed context, undersized output) return [`AeadError`].
//! - A packet that fails authentication is a normal event on an untrusted
//!   network. `decrypt` returns `Ok(false)` for it, and the bytes it wrote
//!   to the output buffer are wiped before returning.

use crate::algorithm::{self, AlgorithmId};
use crate::error::AeadError;
use crate::types::{Nonce, TAG_SIZE, Tag};
use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use chacha20poly1305::ChaCha20Poly1305;
use std::fmt;
use zeroize::Zeroize;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Direction a context is keyed for.
///
/// Authenticated encryption and decryption share one keyed state, so the
/// mode is recorded but does not change how the primitive is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Outgoing packets
    Encrypt,
    /// Incoming packets
    Decrypt,
}

/// Keyed AES-GCM state, one variant per key size.
enum GcmState {
    Aes128(Box<Aes128Gcm>),
    Aes192(Box<Aes192Gcm>),
    Aes256(Box<Aes256Gcm>),
}

/// The single live primitive of a keyed context.
enum NativeState {
    Gcm(GcmState),
    ChaChaPoly(Box<ChaCha20Poly1305>),
}

fn key_primitive<C: KeyInit>(algorithm: AlgorithmId, key: &[u8]) -> Result<Box<C>, AeadError> {
    C::new_from_slice(key)
        .map(Box::new)
        .map_err(|_| AeadError::KeyingFailed(algorithm))
}

fn seal_detached<C>(cipher: &C, nonce: &Nonce, ad: &[u8], buffer: &mut [u8]) -> aes_gcm::aead::Result<Tag>
where
    C: AeadInPlace<NonceSize = U12, TagSize = U16>,
{
    let tag = cipher.encrypt_in_place_detached(GenericArray::from_slice(nonce.as_bytes()), ad, buffer)?;
    let mut bytes = [0u8; TAG_SIZE];
    bytes.copy_from_slice(&tag);
    Ok(Tag::from_bytes(bytes))
}

fn open_detached<C>(
    cipher: &C,
    nonce: &Nonce,
    ad: &[u8],
    buffer: &mut [u8],
    tag: &Tag,
) -> aes_gcm::aead::Result<()>
where
    C: AeadInPlace<NonceSize = U12, TagSize = U16>,
{
    cipher.decrypt_in_place_detached(
        GenericArray::from_slice(nonce.as_bytes()),
        ad,
        buffer,
        GenericArray::from_slice(tag.as_bytes()),
    )
}

impl NativeState {
    /// Key the primitive matching `algorithm`. `key` is already cut to size.
    fn key(algorithm: AlgorithmId, key: &[u8]) -> Result<Self, AeadError> {
        let state = match algorithm {
            AlgorithmId::Aes128Gcm => Self::Gcm(GcmState::Aes128(key_primitive(algorithm, key)?)),
            AlgorithmId::Aes192Gcm => Self::Gcm(GcmState::Aes192(key_primitive(algorithm, key)?)),
            AlgorithmId::Aes256Gcm => Self::Gcm(GcmState::Aes256(key_primitive(algorithm, key)?)),
            AlgorithmId::ChaCha20Poly1305 => Self::ChaChaPoly(key_primitive(algorithm, key)?),
            other => return Err(AeadError::UnusableAlgorithm(other)),
        };
        Ok(state)
    }

    fn algorithm(&self) -> AlgorithmId {
        match self {
            Self::Gcm(GcmState::Aes128(_)) => AlgorithmId::Aes128Gcm,
            Self::Gcm(GcmState::Aes192(_)) => AlgorithmId::Aes192Gcm,
            Self::Gcm(GcmState::Aes256(_)) => AlgorithmId::Aes256Gcm,
            Self::ChaChaPoly(_) => AlgorithmId::ChaCha20Poly1305,
        }
    }

    fn seal(&self, nonce: &Nonce, ad: &[u8], buffer: &mut [u8]) -> aes_gcm::aead::Result<Tag> {
        match self {
            Self::Gcm(GcmState::Aes128(c)) => seal_detached(c.as_ref(), nonce, ad, buffer),
            Self::Gcm(GcmState::Aes192(c)) => seal_detached(c.as_ref(), nonce, ad, buffer),
            Self::Gcm(GcmState::Aes256(c)) => seal_detached(c.as_ref(), nonce, ad, buffer),
            Self::ChaChaPoly(c) => seal_detached(c.as_ref(), nonce, ad, buffer),
        }
    }

    fn open(&self, nonce: &Nonce, ad: &[u8], buffer: &mut [u8], tag: &Tag) -> aes_gcm::aead::Result<()> {
        match self {
            Self::Gcm(GcmState::Aes128(c)) => open_detached(c.as_ref(), nonce, ad, buffer, tag),
            Self::Gcm(GcmState::Aes192(c)) => open_detached(c.as_ref(), nonce, ad, buffer, tag),
            Self::Gcm(GcmState::Aes256(c)) => open_detached(c.as_ref(), nonce, ad, buffer, tag),
            Self::ChaChaPoly(c) => open_detached(c.as_ref(), nonce, ad, buffer, tag),
        }
    }
}

/// Live state of an initialized context.
struct Keyed {
    state: NativeState,
    mode: Mode,
}

impl Keyed {
    fn new(state: NativeState, mode: Mode) -> Self {
        #[cfg(test)]
        accounting::acquire();
        Self { state, mode }
    }
}

#[cfg(test)]
impl Drop for Keyed {
    fn drop(&mut self) {
        accounting::release();
    }
}

/// AEAD context for one direction of a tunnel.
///
/// Created unkeyed. [`init`](Self::init) keys it (erasing any previous
/// state first); [`erase`](Self::erase) or drop releases the key schedule.
/// Calls take `&self` for the packet path and `&mut self` for keying, so a
/// context cannot be re-keyed while a packet operation borrows it.
#[derive(Default)]
pub struct AeadContext {
    keyed: Option<Keyed>,
}

impl AeadContext {
    /// Create an unkeyed context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Key the context for `algorithm`.
    ///
    /// Only the first `key_size` bytes of `key` are used; a longer buffer is
    /// accepted. On any error the context is left unkeyed.
    ///
    /// # Errors
    ///
    /// - [`AeadError::UnusableAlgorithm`] if `algorithm` is not an AEAD cipher.
    /// - [`AeadError::InsufficientKeyMaterial`] if `key` is too short.
    /// - [`AeadError::KeyingFailed`] if the primitive rejects the key.
    pub fn init(&mut self, algorithm: AlgorithmId, key: &[u8], mode: Mode) -> Result<(), AeadError> {
        self.erase();

        let resolution =
            algorithm::resolve(algorithm).map_err(|_| AeadError::UnusableAlgorithm(algorithm))?;

        if key.len() < resolution.key_size {
            return Err(AeadError::InsufficientKeyMaterial {
                required: resolution.key_size,
                provided: key.len(),
            });
        }

        let state = NativeState::key(algorithm, &key[..resolution.key_size])?;
        self.keyed = Some(Keyed::new(state, mode));

        tracing::debug!(algorithm = %algorithm, ?mode, "AEAD context keyed");
        Ok(())
    }

    /// Encrypt `input` into the front of `output`.
    ///
    /// Writes exactly `input.len()` bytes and returns the authentication
    /// tag, which binds `ad` without it being transmitted.
    ///
    /// # Errors
    ///
    /// - [`AeadError::NotInitialized`] if the context is not keyed.
    /// - [`AeadError::BufferTooSmall`] if `output` is shorter than `input`.
    /// - [`AeadError::EncryptionFailed`] if the primitive refuses the input.
    pub fn encrypt(
        &self,
        input: &[u8],
        output: &mut [u8],
        nonce: &Nonce,
        ad: &[u8],
    ) -> Result<Tag, AeadError> {
        let keyed = self.keyed()?;
        let out = sized_output(output, input.len())?;
        out.copy_from_slice(input);
        seal_keyed(keyed, nonce, ad, out)
    }

    /// Encrypt `buffer` in place and return the tag.
    ///
    /// # Errors
    ///
    /// Same as [`encrypt`](Self::encrypt), minus the buffer size check.
    pub fn encrypt_in_place(&self, buffer: &mut [u8], nonce: &Nonce, ad: &[u8]) -> Result<Tag, AeadError> {
        let keyed = self.keyed()?;
        seal_keyed(keyed, nonce, ad, buffer)
    }

    /// Decrypt a packet whose last [`TAG_SIZE`] bytes are the tag.
    ///
    /// Returns `Ok(true)` only when the packet authenticated and exactly
    /// `input.len() - TAG_SIZE` plaintext bytes were written to `output`.
    /// `Ok(false)` means the ciphertext, tag, nonce or `ad` did not match;
    /// the caller must drop the packet. Inputs too short to carry a tag
    /// are reported the same way.
    ///
    /// # Errors
    ///
    /// - [`AeadError::NotInitialized`] if the context is not keyed.
    /// - [`AeadError::BufferTooSmall`] if `output` cannot hold the plaintext.
    pub fn decrypt(
        &self,
        input: &[u8],
        output: &mut [u8],
        nonce: &Nonce,
        ad: &[u8],
    ) -> Result<bool, AeadError> {
        self.keyed()?;

        let Some((ciphertext, tag)) = input.split_last_chunk::<TAG_SIZE>() else {
            tracing::trace!(len = input.len(), "AEAD input shorter than tag");
            return Ok(false);
        };

        self.decrypt_detached(ciphertext, &Tag::from_bytes(*tag), output, nonce, ad)
    }

    /// Decrypt with the tag supplied separately.
    ///
    /// # Errors
    ///
    /// Same as [`decrypt`](Self::decrypt).
    pub fn decrypt_detached(
        &self,
        ciphertext: &[u8],
        tag: &Tag,
        output: &mut [u8],
        nonce: &Nonce,
        ad: &[u8],
    ) -> Result<bool, AeadError> {
        let keyed = self.keyed()?;
        let out = sized_output(output, ciphertext.len())?;
        out.copy_from_slice(ciphertext);

        // `out` is exactly the ciphertext length, so success always yields
        // the full plaintext length.
        if keyed.state.open(nonce, ad, out, tag).is_ok() {
            return Ok(true);
        }

        out.zeroize();
        tracing::trace!(
            algorithm = %keyed.state.algorithm(),
            len = ciphertext.len(),
            "AEAD authentication failed"
        );
        Ok(false)
    }

    /// Release the keyed state. No-op when already unkeyed.
    pub fn erase(&mut self) {
        if let Some(keyed) = self.keyed.take() {
            tracing::debug!(algorithm = %keyed.state.algorithm(), "AEAD context erased");
        }
    }

    /// Whether the context is keyed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.keyed.is_some()
    }

    /// Algorithm of the live state, if keyed.
    #[must_use]
    pub fn algorithm(&self) -> Option<AlgorithmId> {
        self.keyed.as_ref().map(|k| k.state.algorithm())
    }

    /// Mode recorded at the last `init`, if keyed.
    #[must_use]
    pub fn mode(&self) -> Option<Mode> {
        self.keyed.as_ref().map(|k| k.mode)
    }

    /// Capability probe; see [`algorithm::is_supported`].
    #[must_use]
    pub fn is_supported(algorithm: AlgorithmId) -> bool {
        algorithm::is_supported(algorithm)
    }

    fn keyed(&self) -> Result<&Keyed, AeadError> {
        self.keyed.as_ref().ok_or(AeadError::NotInitialized)
    }
}

impl Drop for AeadContext {
    fn drop(&mut self) {
        self.erase();
    }
}

impl fmt::Debug for AeadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AeadContext")
            .field("algorithm", &self.algorithm())
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

fn sized_output(output: &mut [u8], needed: usize) -> Result<&mut [u8], AeadError> {
    let available = output.len();
    output
        .get_mut(..needed)
        .ok_or(AeadError::BufferTooSmall { needed, available })
}

fn seal_keyed(keyed: &Keyed, nonce: &Nonce, ad: &[u8], buffer: &mut [u8]) -> Result<Tag, AeadError> {
    keyed.state.seal(nonce, ad, buffer).map_err(|e| {
        buffer.zeroize();
        AeadError::EncryptionFailed {
            algorithm: keyed.state.algorithm(),
            detail: e.to_string(),
        }
    })
}

/// Per-thread count of keyed states, for leak checks in tests.
#[cfg(test)]
pub(crate) mod accounting {
    use std::cell::Cell;

    thread_local! {
        static LIVE: Cell<usize> = const { Cell::new(0) };
    }

    pub(crate) fn acquire() {
        LIVE.with(|live| live.set(live.get() + 1));
    }

    pub(crate) fn release() {
        LIVE.with(|live| live.set(live.get() - 1));
    }

    pub(crate) fn live() -> usize {
        LIVE.with(Cell::get)
    }
}
