//! Integration tests for packet flows through `tunnelcrypt-aead`.
//!
//! Models two tunnel endpoints: one context keyed for sending, one for
//! receiving, with per-packet counter nonces and the packet id as
//! associated data.

use rand_core::{OsRng, RngCore};
use tunnelcrypt_aead::{
    AeadContext, AeadError, AlgorithmId, MAX_KEY_SIZE, Mode, Nonce, TAG_SIZE, Tag, is_supported,
};

const AEAD_ALGORITHMS: [AlgorithmId; 4] = [
    AlgorithmId::Aes128Gcm,
    AlgorithmId::Aes192Gcm,
    AlgorithmId::Aes256Gcm,
    AlgorithmId::ChaCha20Poly1305,
];

fn random_key() -> [u8; MAX_KEY_SIZE] {
    let mut key = [0u8; MAX_KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    key
}

/// Sender and receiver sharing one key.
fn endpoint_pair(algorithm: AlgorithmId, key: &[u8]) -> (AeadContext, AeadContext) {
    let mut send = AeadContext::new();
    send.init(algorithm, key, Mode::Encrypt)
        .expect("Failed to key sender");
    let mut recv = AeadContext::new();
    recv.init(algorithm, key, Mode::Decrypt)
        .expect("Failed to key receiver");
    (send, recv)
}

/// Build `ciphertext || tag` for one packet.
fn seal_packet(ctx: &AeadContext, packet_id: u64, salt: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let nonce = Nonce::from_counter(packet_id, salt);
    let mut packet = vec![0u8; payload.len() + TAG_SIZE];
    let tag = ctx
        .encrypt(payload, &mut packet[..payload.len()], &nonce, &packet_id.to_be_bytes())
        .expect("Encryption failed");
    packet[payload.len()..].copy_from_slice(tag.as_bytes());
    packet
}

fn open_packet(ctx: &AeadContext, packet_id: u64, salt: &[u8; 4], packet: &[u8]) -> Option<Vec<u8>> {
    let nonce = Nonce::from_counter(packet_id, salt);
    let mut out = vec![0u8; packet.len().saturating_sub(TAG_SIZE)];
    let ok = ctx
        .decrypt(packet, &mut out, &nonce, &packet_id.to_be_bytes())
        .expect("Receiver is keyed");
    ok.then_some(out)
}

// ============================================================================
// Packet Stream Tests
// ============================================================================

#[test]
fn test_packet_stream_all_algorithms() {
    let salt = [0xde, 0xad, 0xbe, 0xef];

    for algorithm in AEAD_ALGORITHMS {
        let (send, recv) = endpoint_pair(algorithm, &random_key());

        for packet_id in 1..=64u64 {
            let payload: Vec<u8> = (0..packet_id as usize * 17).map(|i| (i & 0xFF) as u8).collect();
            let packet = seal_packet(&send, packet_id, &salt, &payload);

            let opened = open_packet(&recv, packet_id, &salt, &packet)
                .unwrap_or_else(|| panic!("{algorithm}: packet {packet_id} rejected"));
            assert_eq!(opened, payload);
        }
    }
}

#[test]
fn test_replayed_packet_under_wrong_id_rejected() {
    let salt = [1, 2, 3, 4];
    let (send, recv) = endpoint_pair(AlgorithmId::ChaCha20Poly1305, &random_key());

    let packet = seal_packet(&send, 7, &salt, b"keepalive");
    assert!(open_packet(&recv, 7, &salt, &packet).is_some());
    assert!(open_packet(&recv, 8, &salt, &packet).is_none());
}

#[test]
fn test_mismatched_salt_rejected() {
    let (send, recv) = endpoint_pair(AlgorithmId::Aes256Gcm, &random_key());

    let packet = seal_packet(&send, 1, &[0, 0, 0, 1], b"payload");
    assert!(open_packet(&recv, 1, &[0, 0, 0, 2], &packet).is_none());
}

#[test]
fn test_endpoints_with_different_keys_cannot_talk() {
    for algorithm in AEAD_ALGORITHMS {
        let mut send = AeadContext::new();
        send.init(algorithm, &random_key(), Mode::Encrypt).unwrap();
        let mut recv = AeadContext::new();
        recv.init(algorithm, &random_key(), Mode::Decrypt).unwrap();

        let packet = seal_packet(&send, 1, &[0; 4], b"secret");
        assert!(open_packet(&recv, 1, &[0; 4], &packet).is_none());
    }
}

#[test]
fn test_same_key_different_algorithm_rejected() {
    let key = random_key();
    let mut send = AeadContext::new();
    send.init(AlgorithmId::Aes256Gcm, &key, Mode::Encrypt).unwrap();
    let mut recv = AeadContext::new();
    recv.init(AlgorithmId::ChaCha20Poly1305, &key, Mode::Decrypt)
        .unwrap();

    let packet = seal_packet(&send, 1, &[0; 4], b"cross-algorithm");
    assert!(open_packet(&recv, 1, &[0; 4], &packet).is_none());
}

// ============================================================================
// Rekey Tests
// ============================================================================

#[test]
fn test_rekey_across_algorithms() {
    let salt = [9, 9, 9, 9];
    let mut send = AeadContext::new();
    let mut recv = AeadContext::new();

    for (epoch, algorithm) in AEAD_ALGORITHMS.iter().cycle().take(8).enumerate() {
        let key = random_key();
        send.init(*algorithm, &key, Mode::Encrypt).unwrap();
        recv.init(*algorithm, &key, Mode::Decrypt).unwrap();
        assert_eq!(send.algorithm(), Some(*algorithm));

        let payload = format!("epoch {epoch}");
        let packet = seal_packet(&send, epoch as u64, &salt, payload.as_bytes());
        assert_eq!(
            open_packet(&recv, epoch as u64, &salt, &packet).as_deref(),
            Some(payload.as_bytes())
        );
    }
}

#[test]
fn test_packets_from_old_key_rejected_after_rekey() {
    let salt = [0; 4];
    let (mut send, mut recv) = endpoint_pair(AlgorithmId::Aes128Gcm, &random_key());
    let old_packet = seal_packet(&send, 1, &salt, b"before rekey");

    let new_key = random_key();
    send.init(AlgorithmId::Aes128Gcm, &new_key, Mode::Encrypt).unwrap();
    recv.init(AlgorithmId::Aes128Gcm, &new_key, Mode::Decrypt).unwrap();

    assert!(open_packet(&recv, 1, &salt, &old_packet).is_none());
    let new_packet = seal_packet(&send, 1, &salt, b"after rekey");
    assert!(open_packet(&recv, 1, &salt, &new_packet).is_some());
}

#[test]
fn test_failed_rekey_leaves_endpoint_unkeyed() {
    let (mut send, _) = endpoint_pair(AlgorithmId::Aes256Gcm, &random_key());

    let err = send
        .init(AlgorithmId::Aes256Gcm, &[0u8; 16], Mode::Encrypt)
        .unwrap_err();
    assert_eq!(
        err,
        AeadError::InsufficientKeyMaterial {
            required: 32,
            provided: 16
        }
    );
    assert!(!send.is_initialized());

    let mut out = [0u8; 4];
    assert_eq!(
        send.encrypt(b"data", &mut out, &Nonce::default(), b""),
        Err(AeadError::NotInitialized)
    );
}

#[test]
fn test_shutdown_erases_endpoint() {
    let (mut send, mut recv) = endpoint_pair(AlgorithmId::ChaCha20Poly1305, &random_key());
    let packet = seal_packet(&send, 3, &[0; 4], b"last packet");

    send.erase();
    recv.erase();
    assert!(!send.is_initialized());
    assert_eq!(recv.algorithm(), None);

    let mut out = vec![0u8; packet.len() - TAG_SIZE];
    assert_eq!(
        recv.decrypt(&packet, &mut out, &Nonce::from_counter(3, &[0; 4]), &3u64.to_be_bytes()),
        Err(AeadError::NotInitialized)
    );
}

// ============================================================================
// Negotiation Tests
// ============================================================================

#[test]
fn test_negotiation_picks_first_supported() {
    let offered = [
        AlgorithmId::BfCbc,
        AlgorithmId::Aes256Cbc,
        AlgorithmId::ChaCha20Poly1305,
        AlgorithmId::Aes256Gcm,
    ];
    let chosen = offered
        .iter()
        .copied()
        .find(|a| is_supported(*a))
        .expect("one AEAD offered");
    assert_eq!(chosen, AlgorithmId::ChaCha20Poly1305);

    let mut ctx = AeadContext::new();
    for algorithm in AlgorithmId::ALL {
        let result = ctx.init(algorithm, &random_key(), Mode::Encrypt);
        assert_eq!(result.is_ok(), AeadContext::is_supported(algorithm), "{algorithm}");
    }
}

// ============================================================================
// In-place and Detached Paths
// ============================================================================

#[test]
fn test_in_place_sender_detached_receiver() {
    let nonce = Nonce::generate(&mut OsRng);

    for algorithm in AEAD_ALGORITHMS {
        let (send, recv) = endpoint_pair(algorithm, &random_key());

        let mut buffer = b"in-place packet body".to_vec();
        let tag = send.encrypt_in_place(&mut buffer, &nonce, b"hdr").unwrap();
        assert_ne!(&buffer[..], b"in-place packet body");

        let wire_tag = Tag::from_slice(tag.as_bytes()).unwrap();
        let mut out = vec![0u8; buffer.len()];
        assert!(
            recv.decrypt_detached(&buffer, &wire_tag, &mut out, &nonce, b"hdr")
                .unwrap()
        );
        assert_eq!(&out[..], b"in-place packet body");
    }
}

#[test]
fn test_self_test_passes() {
    tunnelcrypt_aead::self_test().expect("Known-answer tests should pass");
}
