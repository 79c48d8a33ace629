//! AEAD context error types.
//!
//! Every variant here is a setup or programming error. A ciphertext that
//! fails authentication is not an error: `decrypt` reports it as `false`.

use crate::algorithm::AlgorithmId;
use thiserror::Error;

/// Errors raised by the AEAD context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AeadError {
    /// Identifier is not one of the supported AEAD ciphers
    #[error("{}: unsupported AEAD algorithm", .0.name())]
    UnsupportedAlgorithm(AlgorithmId),

    /// `init` was asked to key an algorithm it cannot use
    #[error("{}: not usable", .0.name())]
    UnusableAlgorithm(AlgorithmId),

    /// Key buffer is shorter than the algorithm requires
    #[error("insufficient key material: {required} bytes required, {provided} provided")]
    InsufficientKeyMaterial {
        /// Key bytes the algorithm needs
        required: usize,
        /// Key bytes supplied by the caller
        provided: usize,
    },

    /// The primitive rejected the key during setup
    #[error("{}: keying failed", .0.name())]
    KeyingFailed(AlgorithmId),

    /// Operation attempted on a context that is not keyed
    #[error("uninitialized")]
    NotInitialized,

    /// Encryption failed inside the primitive
    #[error("{} encryption failed: {detail}", .algorithm.name())]
    EncryptionFailed {
        /// Algorithm that was active
        algorithm: AlgorithmId,
        /// Error reported by the primitive
        detail: String,
    },

    /// Output buffer cannot hold the result
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes the operation writes
        needed: usize,
        /// Bytes available in the output buffer
        available: usize,
    },

    /// Known-answer self-test mismatch
    #[error("{} self-test failed at {stage}", .algorithm.name())]
    SelfTestFailed {
        /// Algorithm under test
        algorithm: AlgorithmId,
        /// Step that produced the wrong answer
        stage: &'static str,
    },
}
