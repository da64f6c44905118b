// Path: crates/trifair-engine/src/proof.rs
//! C5: proof assembly, immediately after mixing and mapping complete.
//!
//! The matching offline verifier lives in [`crate::verify`] (C10) since the
//! spec treats "no I/O, pure function of its published inputs" as its own
//! contract, separate from the stateful build path that reaches into a live
//! commitment and server secret.

use trifair_crypto::hash::hmac_sha256;
use trifair_types::entropy::{ClientSeed, Commitment, Digest32, MappingMode, Proof};

use crate::mapper;

/// `proofId = first 32 hex chars of SHA256(combinedEntropy || ":" || nonce)`.
pub(crate) fn proof_id(combined_entropy: &Digest32, nonce: u64) -> String {
    let mut message = Vec::with_capacity(40);
    message.extend_from_slice(combined_entropy.as_bytes());
    message.extend_from_slice(format!(":{nonce}").as_bytes());
    let full = hex::encode(trifair_crypto::hash::sha256(&message));
    full.get(..32).unwrap_or(&full).to_string()
}

/// `signature = HMAC-SHA256(serverSecret, proofId||":"||commitHash||":"||(clientSeed or "test")||":"||nonce)`.
pub(crate) fn sign(
    server_secret: &[u8],
    proof_id: &str,
    commit_hash: &Digest32,
    client_seed: &ClientSeed,
    nonce: u64,
) -> Digest32 {
    let mut message = Vec::new();
    message.extend_from_slice(proof_id.as_bytes());
    message.push(b':');
    message.extend_from_slice(commit_hash.to_hex().as_bytes());
    message.push(b':');
    message.extend_from_slice(client_seed.mixing_bytes());
    message.push(b':');
    message.extend_from_slice(nonce.to_string().as_bytes());
    Digest32::new(hmac_sha256(server_secret, &message))
}

/// Assembles the immutable Proof record right after mixing and mapping
/// (§4.5 Build). `entropy_digest` is the raw physics digest (C1's output,
/// pre-mix) that `thetaVector` is derived from; `combined_entropy` is the
/// post-mix value (§3 Combined Entropy) that actually drove the mapping.
#[allow(clippy::too_many_arguments)]
pub fn build_proof(
    commitment: &Commitment,
    client_seed: &ClientSeed,
    nonce: u64,
    entropy_digest: &Digest32,
    combined_entropy: &Digest32,
    server_secret: &[u8],
    mapping_mode: MappingMode,
    now_ms: u64,
) -> Proof {
    let theta_vector = mapper::theta_vector_from_digest(entropy_digest);
    let id = proof_id(combined_entropy, nonce);
    let signature = sign(server_secret, &id, &commitment.commit_hash, client_seed, nonce);

    Proof {
        proof_id: id,
        commit_hash: commitment.commit_hash,
        house_seed: commitment.house_seed,
        client_seed: client_seed.as_proof_field(),
        nonce,
        theta_vector,
        combined_entropy: *combined_entropy,
        signature,
        test_mode: client_seed.is_test_mode(),
        mapping_mode,
        version: Proof::CURRENT_VERSION,
        created_at: now_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trifair_crypto::commitment;

    #[test]
    fn test_mode_proof_has_no_client_seed_and_is_flagged() {
        let house_seed = Digest32::new([0x11; 32]);
        let commitment = commitment::commit(house_seed, 0);
        let entropy_digest = Digest32::new([0x22; 32]);
        let combined = commitment::mix(&commitment.house_seed, &ClientSeed::TestMode);

        let proof = build_proof(
            &commitment,
            &ClientSeed::TestMode,
            1,
            &entropy_digest,
            &combined,
            b"secret",
            MappingMode::Grid,
            1_000,
        );

        assert!(proof.test_mode);
        assert!(proof.client_seed.is_none());
    }

    #[test]
    fn proof_id_is_32_hex_chars_and_deterministic() {
        let combined = Digest32::new([0xaa; 32]);
        let a = proof_id(&combined, 7);
        let b = proof_id(&combined, 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_sensitive_to_every_input() {
        let commit_hash = Digest32::new([0x01; 32]);
        let a = sign(b"secret", "proof-id", &commit_hash, &ClientSeed::Provided(b"alice".to_vec()), 1);
        let b = sign(b"secret", "proof-id", &commit_hash, &ClientSeed::Provided(b"bob".to_vec()), 1);
        let c = sign(b"secret", "proof-id", &commit_hash, &ClientSeed::Provided(b"alice".to_vec()), 2);
        let d = sign(b"other-secret", "proof-id", &commit_hash, &ClientSeed::Provided(b"alice".to_vec()), 1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}
