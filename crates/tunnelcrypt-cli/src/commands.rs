//! Command implementations.

use anyhow::Context;
use tunnelcrypt_aead::{AeadContext, AlgorithmId, Mode, NONCE_SIZE, Nonce, TAG_SIZE};
use zeroize::Zeroizing;

/// Decode a hex key into zeroizing storage.
pub fn parse_key(key_hex: &str) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    let key = hex::decode(key_hex.trim()).context("key is not valid hex")?;
    Ok(Zeroizing::new(key))
}

fn parse_nonce(nonce_hex: &str) -> anyhow::Result<Nonce> {
    let bytes = hex::decode(nonce_hex.trim()).context("nonce is not valid hex")?;
    Nonce::from_slice(&bytes)
        .with_context(|| format!("nonce must be {} bytes, got {}", NONCE_SIZE, bytes.len()))
}

/// One line per algorithm identifier: name, AEAD support, key size.
pub fn algorithm_table() -> Vec<String> {
    AlgorithmId::ALL
        .iter()
        .map(|algorithm| {
            let supported = if AeadContext::is_supported(*algorithm) {
                "yes"
            } else {
                "no"
            };
            let key_size = algorithm
                .key_size()
                .map_or_else(|| "-".to_string(), |size| size.to_string());
            format!("{:<20} {:<4} {}", algorithm.name(), supported, key_size)
        })
        .collect()
}

/// Encrypt `plaintext_hex`, returning `ciphertext || tag` as hex.
pub fn seal(
    algorithm: AlgorithmId,
    key: &[u8],
    nonce_hex: &str,
    ad_hex: &str,
    plaintext_hex: &str,
) -> anyhow::Result<String> {
    let nonce = parse_nonce(nonce_hex)?;
    let ad = hex::decode(ad_hex.trim()).context("associated data is not valid hex")?;
    let plaintext =
        Zeroizing::new(hex::decode(plaintext_hex.trim()).context("plaintext is not valid hex")?);

    let mut ctx = AeadContext::new();
    ctx.init(algorithm, key, Mode::Encrypt)?;

    let mut packet = vec![0u8; plaintext.len() + TAG_SIZE];
    let tag = ctx.encrypt(&plaintext, &mut packet[..plaintext.len()], &nonce, &ad)?;
    packet[plaintext.len()..].copy_from_slice(tag.as_bytes());

    Ok(hex::encode(packet))
}

/// Authenticate and decrypt `sealed_hex`, returning the plaintext as hex.
pub fn open(
    algorithm: AlgorithmId,
    key: &[u8],
    nonce_hex: &str,
    ad_hex: &str,
    sealed_hex: &str,
) -> anyhow::Result<String> {
    let nonce = parse_nonce(nonce_hex)?;
    let ad = hex::decode(ad_hex.trim()).context("associated data is not valid hex")?;
    let sealed = hex::decode(sealed_hex.trim()).context("sealed input is not valid hex")?;

    let mut ctx = AeadContext::new();
    ctx.init(algorithm, key, Mode::Decrypt)?;

    let mut plaintext = Zeroizing::new(vec![0u8; sealed.len().saturating_sub(TAG_SIZE)]);
    if !ctx.decrypt(&sealed, &mut plaintext, &nonce, &ad)? {
        anyhow::bail!("authentication failed");
    }

    Ok(hex::encode(plaintext.as_slice()))
}
