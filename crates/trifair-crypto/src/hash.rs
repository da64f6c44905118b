// Path: crates/trifair-crypto/src/hash.rs
//! C2: SHA-256, HMAC-SHA-256, and HKDF (RFC 5869) primitives.
//!
//! These are utilities for downstream callers (`trifair-engine`'s KDF
//! surface and any external auditor reimplementing §4.2). The main entropy
//! pipeline (commitment mixing, the grid mapper) uses raw HMAC directly
//! rather than going through HKDF, for clarity and speed.

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use trifair_types::config::HashAlgorithm;
use trifair_types::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// `SHA256(message)`.
pub fn sha256(message: &[u8]) -> [u8; 32] {
    use sha2::Digest;
    Sha256::digest(message).into()
}

/// `HMAC-SHA256(key, message)`. HMAC accepts arbitrary-length keys, so the
/// `Err` arm below is unreachable in practice; it exists only because `Mac`
/// is generic over ciphers that do impose a key-length bound.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = match <HmacSha256 as Mac>::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => return sha256(&[key, message].concat()),
    };
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// `hkdfExtract(salt, ikm) -> prk` (§4.2). An empty `salt` is treated as
/// `hashLen` zero bytes, which is exactly what the underlying RFC 5869
/// implementation already does for an empty salt.
pub fn hkdf_extract_sha256(salt: &[u8], ikm: &[u8]) -> [u8; 32] {
    let (prk, _) = Hkdf::<Sha256>::extract(Some(salt), ikm);
    prk.into()
}

/// `hkdfExpand(prk, info, L) -> okm`. Fails if `L > 255 * hashLen`.
pub fn hkdf_expand_sha256(prk: &[u8; 32], info: &[u8], length: usize) -> Result<Vec<u8>, CryptoError> {
    let hk = Hkdf::<Sha256>::from_prk(prk).map_err(|_| CryptoError::InvalidKeyLength("prk".into()))?;
    let mut okm = vec![0u8; length];
    hk.expand(info, &mut okm).map_err(|_| CryptoError::HkdfLengthExceeded {
        requested: length,
        max: 255 * 32,
    })?;
    Ok(okm)
}

/// `deriveSeed(serverSeed, clientSeed, nonce) = HKDF(ikm = serverSeed||":"||clientSeed||":"||nonce, info = "three-body-entropy-seed", L = 32)` (§4.2).
///
/// Dispatches on [`HashAlgorithm`] so callers can select sha256/384/512 for
/// this utility path; the proof path itself (§4.5) is always SHA-256.
pub fn derive_seed(
    server_seed: &[u8],
    client_seed: &[u8],
    nonce: u64,
    algorithm: HashAlgorithm,
) -> Result<Vec<u8>, CryptoError> {
    const INFO: &[u8] = b"three-body-entropy-seed";
    let mut ikm = Vec::with_capacity(server_seed.len() + client_seed.len() + 24);
    ikm.extend_from_slice(server_seed);
    ikm.extend_from_slice(b":");
    ikm.extend_from_slice(client_seed);
    ikm.extend_from_slice(b":");
    ikm.extend_from_slice(nonce.to_string().as_bytes());

    match algorithm {
        HashAlgorithm::Sha256 => {
            let (prk, hk) = Hkdf::<Sha256>::extract(None, &ikm);
            let _ = prk;
            let mut okm = vec![0u8; 32];
            hk.expand(INFO, &mut okm)
                .map_err(|_| CryptoError::HkdfLengthExceeded { requested: 32, max: 255 * 32 })?;
            Ok(okm)
        }
        HashAlgorithm::Sha384 => {
            let (_, hk) = Hkdf::<Sha384>::extract(None, &ikm);
            let mut okm = vec![0u8; 32];
            hk.expand(INFO, &mut okm)
                .map_err(|_| CryptoError::HkdfLengthExceeded { requested: 32, max: 255 * 48 })?;
            Ok(okm)
        }
        HashAlgorithm::Sha512 => {
            let (_, hk) = Hkdf::<Sha512>::extract(None, &ikm);
            let mut okm = vec![0u8; 32];
            hk.expand(INFO, &mut okm)
                .map_err(|_| CryptoError::HkdfLengthExceeded { requested: 32, max: 255 * 64 })?;
            Ok(okm)
        }
    }
}
