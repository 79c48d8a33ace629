//! Fuzz target for the AEAD context
//!
//! Keys every identifier with arbitrary key material, then seals and opens
//! arbitrary packets. Nothing here may panic, and an untouched packet must
//! always open.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tunnelcrypt_aead::{AeadContext, AlgorithmId, Mode, Nonce, TAG_SIZE};

#[derive(Debug, Arbitrary)]
struct AeadInput {
    algorithm: u8,
    key: Vec<u8>,
    nonce: [u8; 12],
    plaintext: Vec<u8>,
    ad: Vec<u8>,
}

fuzz_target!(|input: AeadInput| {
    let algorithm = AlgorithmId::ALL[input.algorithm as usize % AlgorithmId::ALL.len()];
    let nonce = Nonce::from_bytes(input.nonce);

    let mut ctx = AeadContext::new();
    if ctx.init(algorithm, &input.key, Mode::Encrypt).is_err() {
        assert!(!ctx.is_initialized());
        return;
    }

    let len = input.plaintext.len();
    let mut packet = vec![0u8; len + TAG_SIZE];
    let tag = ctx
        .encrypt(&input.plaintext, &mut packet[..len], &nonce, &input.ad)
        .expect("keyed context encrypts");
    packet[len..].copy_from_slice(tag.as_bytes());

    let mut out = vec![0u8; len];
    assert!(ctx.decrypt(&packet, &mut out, &nonce, &input.ad).unwrap_or(false));
    assert_eq!(out, input.plaintext);
});
