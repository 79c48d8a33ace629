//! # tunnelcrypt AEAD
//!
//! Packet AEAD layer for a secure tunnel.
//!
//! This crate provides:
//! - Algorithm resolution from the tunnel's cipher identifiers
//! - A keyed [`AeadContext`] that dispatches to AES-GCM or ChaCha20-Poly1305
//! - Fixed-size [`Nonce`] and [`Tag`] values
//! - A known-answer [`self_test`]
//!
//! ## Cipher Suite
//!
//! | Algorithm | Key | Nonce | Tag |
//! |-----------|-----|-------|-----|
//! | AES-128-GCM | 16 bytes | 12 bytes | 16 bytes |
//! | AES-192-GCM | 24 bytes | 12 bytes | 16 bytes |
//! | AES-256-GCM | 32 bytes | 12 bytes | 16 bytes |
//! | ChaCha20-Poly1305 | 32 bytes | 12 bytes | 16 bytes |
//!
//! ## Usage
//!
//! ```
//! use tunnelcrypt_aead::{AeadContext, AlgorithmId, Mode, Nonce, TAG_SIZE};
//!
//! let mut ctx = AeadContext::new();
//! ctx.init(AlgorithmId::ChaCha20Poly1305, &[0u8; 32], Mode::Encrypt)?;
//!
//! let nonce = Nonce::from_counter(1, &[0u8; 4]);
//! let mut packet = [0u8; 5 + TAG_SIZE];
//! let tag = ctx.encrypt(b"hello", &mut packet[..5], &nonce, b"")?;
//! packet[5..].copy_from_slice(tag.as_bytes());
//!
//! let mut plaintext = [0u8; 5];
//! assert!(ctx.decrypt(&packet, &mut plaintext, &nonce, b"")?);
//! assert_eq!(&plaintext, b"hello");
//! # Ok::<(), tunnelcrypt_aead::AeadError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod algorithm;
pub mod context;
pub mod error;
pub mod selftest;
pub mod types;

pub use algorithm::{AlgorithmId, CipherFamily, Resolution, is_supported, resolve};
pub use context::{AeadContext, Mode};
pub use error::AeadError;
pub use selftest::self_test;
pub use types::{MAX_KEY_SIZE, NONCE_SIZE, Nonce, TAG_SIZE, Tag};
