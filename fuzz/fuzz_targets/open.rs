//! Fuzz target for opening untrusted packets
//!
//! Arbitrary bytes must be rejected without panicking.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tunnelcrypt_aead::{AeadContext, AlgorithmId, Mode, Nonce};

#[derive(Debug, Arbitrary)]
struct OpenInput {
    chacha: bool,
    key: [u8; 32],
    nonce: [u8; 12],
    packet: Vec<u8>,
    ad: Vec<u8>,
    output_len: u16,
}

fuzz_target!(|input: OpenInput| {
    let algorithm = if input.chacha {
        AlgorithmId::ChaCha20Poly1305
    } else {
        AlgorithmId::Aes256Gcm
    };

    let mut ctx = AeadContext::new();
    if ctx.init(algorithm, &input.key, Mode::Decrypt).is_err() {
        return;
    }

    let mut out = vec![0u8; input.output_len as usize];
    let _ = ctx.decrypt(&input.packet, &mut out, &Nonce::from_bytes(input.nonce), &input.ad);
});
