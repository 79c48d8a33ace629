//! Known-answer self-test.
//!
//! Runs one published vector per supported algorithm through a fresh
//! [`AeadContext`] so a caller can confirm the primitives before offering
//! them during negotiation.

use crate::algorithm::AlgorithmId;
use crate::context::{AeadContext, Mode};
use crate::error::AeadError;
use crate::types::{Nonce, TAG_SIZE};

struct KnownAnswer {
    algorithm: AlgorithmId,
    key: &'static str,
    nonce: &'static str,
    ad: &'static str,
    plaintext: &'static str,
    ciphertext: &'static str,
    tag: &'static str,
}

// GCM: test cases 2, 8 and 14 of the McGrew-Viega GCM paper.
// ChaCha20-Poly1305: RFC 8439 section 2.8.2.
const VECTORS: [KnownAnswer; 4] = [
    KnownAnswer {
        algorithm: AlgorithmId::Aes128Gcm,
        key: "00000000000000000000000000000000",
        nonce: "000000000000000000000000",
        ad: "",
        plaintext: "00000000000000000000000000000000",
        ciphertext: "0388dace60b6a392f328c2b971b2fe78",
        tag: "ab6e47d42cec13bdf53a67b21257bddf",
    },
    KnownAnswer {
        algorithm: AlgorithmId::Aes192Gcm,
        key: "000000000000000000000000000000000000000000000000",
        nonce: "000000000000000000000000",
        ad: "",
        plaintext: "00000000000000000000000000000000",
        ciphertext: "98e7247c07f0fe411c267e4384b0f600",
        tag: "2ff58d80033927ab8ef4d4587514f0fb",
    },
    KnownAnswer {
        algorithm: AlgorithmId::Aes256Gcm,
        key: "0000000000000000000000000000000000000000000000000000000000000000",
        nonce: "000000000000000000000000",
        ad: "",
        plaintext: "00000000000000000000000000000000",
        ciphertext: "cea7403d4d606b6e074ec5d3baf39d18",
        tag: "d0d1c8a799996bf0265b98b5d48ab919",
    },
    KnownAnswer {
        algorithm: AlgorithmId::ChaCha20Poly1305,
        key: "808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9f",
        nonce: "070000004041424344454647",
        ad: "50515253c0c1c2c3c4c5c6c7",
        plaintext: "4c616469657320616e642047656e746c656d656e206f662074686520636c6173\
                    73206f66202739393a204966204920636f756c64206f6666657220796f75206f\
                    6e6c79206f6e652074697020666f7220746865206675747572652c2073756e73\
                    637265656e20776f756c642062652069742e",
        ciphertext: "d31a8d34648e60db7b86afbc53ef7ec2a4aded51296e08fea9e2b5a736ee62d6\
                     3dbea45e8ca9671282fafb69da92728b1a71de0a9e060b2905d6a5b67ecd3b36\
                     92ddbd7f2d778b8c9803aee328091b58fab324e4fad675945585808b4831d7bc\
                     3ff4def08e4b7a9de576d26586cec64b6116",
        tag: "1ae10b594f09e26a7e902ecbd0600691",
    },
];

/// Run the known-answer test for every supported algorithm.
///
/// # Errors
///
/// Returns [`AeadError::SelfTestFailed`] naming the first algorithm and
/// stage that produced a wrong answer.
pub fn self_test() -> Result<(), AeadError> {
    for vector in &VECTORS {
        run(vector)?;
    }
    tracing::debug!(count = VECTORS.len(), "AEAD self-test passed");
    Ok(())
}

fn run(vector: &KnownAnswer) -> Result<(), AeadError> {
    let algorithm = vector.algorithm;
    let fail = |stage| AeadError::SelfTestFailed { algorithm, stage };
    let decode = |field: &str| hex::decode(field).map_err(|_| fail("vector decoding"));

    let key = decode(vector.key)?;
    let nonce = Nonce::from_slice(&decode(vector.nonce)?).ok_or_else(|| fail("vector decoding"))?;
    let ad = decode(vector.ad)?;
    let plaintext = decode(vector.plaintext)?;
    let expected_ct = decode(vector.ciphertext)?;
    let expected_tag = decode(vector.tag)?;

    let mut ctx = AeadContext::new();
    ctx.init(algorithm, &key, Mode::Encrypt)?;

    let mut packet = vec![0u8; plaintext.len() + TAG_SIZE];
    let tag = ctx.encrypt(&plaintext, &mut packet[..plaintext.len()], &nonce, &ad)?;
    if packet[..plaintext.len()] != expected_ct[..] {
        return Err(fail("ciphertext"));
    }
    if tag.as_bytes()[..] != expected_tag[..] {
        return Err(fail("tag"));
    }
    packet[plaintext.len()..].copy_from_slice(tag.as_bytes());

    ctx.init(algorithm, &key, Mode::Decrypt)?;
    let mut recovered = vec![0u8; plaintext.len()];
    if !ctx.decrypt(&packet, &mut recovered, &nonce, &ad)? || recovered != plaintext {
        return Err(fail("decrypt"));
    }

    let last = packet.len() - 1;
    packet[last] ^= 0x01;
    if ctx.decrypt(&packet, &mut recovered, &nonce, &ad)? {
        return Err(fail("forgery rejection"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_test_passes() {
        self_test().unwrap();
    }

    #[test]
    fn test_vectors_cover_supported_set() {
        let covered: Vec<_> = VECTORS.iter().map(|v| v.algorithm).collect();
        for alg in AlgorithmId::ALL.into_iter().filter(|a| a.is_aead_supported()) {
            assert!(covered.contains(&alg), "{alg} has no known answer");
        }
    }

    #[test]
    fn test_corrupted_vector_reports_stage() {
        let mut bad = KnownAnswer { ..VECTORS[0] };
        bad.tag = "ab6e47d42cec13bdf53a67b21257bdde";
        assert_eq!(
            run(&bad),
            Err(AeadError::SelfTestFailed {
                algorithm: AlgorithmId::Aes128Gcm,
                stage: "tag"
            })
        );
    }
}
