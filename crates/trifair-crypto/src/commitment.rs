// Path: crates/trifair-crypto/src/commitment.rs
//! C3: commit / verify-commit / mix, and the reveal-once `createRound` helper.

use std::collections::HashSet;
use std::sync::Mutex;

use trifair_types::entropy::{ClientSeed, CombinedEntropy, Commitment, Digest32};
use trifair_types::error::EngineError;

use crate::hash::{hmac_sha256, sha256};

/// `commit(houseSeed) -> { commitHash, createdAt }` (§4.3).
pub fn commit(house_seed: Digest32, now_ms: u64) -> Commitment {
    Commitment {
        commit_hash: Digest32::new(sha256(house_seed.as_bytes())),
        house_seed,
        created_at: now_ms,
    }
}

/// `verifyCommit(houseSeed, commitHash) -> bool` (§4.3, §8 scenario 1).
pub fn verify_commit(house_seed: &Digest32, commit_hash: &Digest32) -> bool {
    sha256(house_seed.as_bytes()) == commit_hash.0
}

/// `mix(houseSeed, clientSeed | nil) -> combinedEntropy` (§3 Combined Entropy, §4.3).
///
/// Uses `houseSeed` as the HMAC key and either the client seed or the
/// literal `"test"` marker as the message.
pub fn mix(house_seed: &Digest32, client_seed: &ClientSeed) -> CombinedEntropy {
    Digest32::new(hmac_sha256(house_seed.as_bytes(), client_seed.mixing_bytes()))
}

/// Tracks rounds that have already been revealed so a second reveal of the
/// same `(houseSeed, nonce)` pair fails with [`EngineError::AlreadyRevealed`]
/// instead of silently re-deriving the same combined entropy.
#[derive(Default)]
pub struct RoundRegistry {
    revealed: Mutex<HashSet<String>>,
}

impl RoundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn round_key(house_seed: &Digest32, nonce: u64) -> String {
        format!("{}:{nonce}", house_seed.to_hex())
    }

    /// Composes `commit` + `mix`, enforcing reveal-once on `(houseSeed, nonce)`.
    /// Returns the commitment (for the client, published before the spin)
    /// and the combined entropy (for the server, to drive the mapping).
    pub fn create_round(
        &self,
        house_seed: Digest32,
        client_seed: &ClientSeed,
        nonce: u64,
        now_ms: u64,
    ) -> Result<(Commitment, CombinedEntropy), EngineError> {
        let key = Self::round_key(&house_seed, nonce);
        {
            let mut revealed = self
                .revealed
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if !revealed.insert(key) {
                return Err(EngineError::AlreadyRevealed(format!(
                    "round for house seed {} nonce {} already revealed",
                    house_seed.to_hex(),
                    nonce
                )));
            }
        }
        let commitment = commit(house_seed, now_ms);
        let combined = mix(&commitment.house_seed, client_seed);
        Ok((commitment, combined))
    }

    /// Whether `(houseSeed, nonce)` has already been revealed.
    pub fn is_revealed(&self, house_seed: &Digest32, nonce: u64) -> bool {
        self.revealed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains(&Self::round_key(house_seed, nonce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_seed() -> Digest32 {
        Digest32::new([0u8; 32])
    }

    #[test]
    fn commit_verify_round_trip() {
        let seed = zero_seed();
        let commitment = commit(seed, 0);
        assert_eq!(
            commitment.commit_hash.to_hex(),
            "66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925"
        );
        assert!(verify_commit(&seed, &commitment.commit_hash));

        let mut tampered = [0u8; 32];
        tampered[0] = 0x01;
        assert!(!verify_commit(&Digest32::new(tampered), &commitment.commit_hash));
    }

    #[test]
    fn mixing_is_deterministic() {
        let seed = Digest32::new([7u8; 32]);
        let client = ClientSeed::Provided(b"alice".to_vec());
        let a = mix(&seed, &client);
        let b = mix(&seed, &client);
        assert_eq!(a, b);
    }

    #[test]
    fn mixing_differs_by_client_seed() {
        let seed = Digest32::new([7u8; 32]);
        let a = mix(&seed, &ClientSeed::Provided(b"alice".to_vec()));
        let b = mix(&seed, &ClientSeed::Provided(b"bob".to_vec()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_mode_uses_literal_marker() {
        let seed = Digest32::new([7u8; 32]);
        let a = mix(&seed, &ClientSeed::TestMode);
        let b = mix(&seed, &ClientSeed::Provided(b"test".to_vec()));
        assert_eq!(a, b);
    }

    #[test]
    fn reveal_once_is_enforced() {
        let registry = RoundRegistry::new();
        let seed = Digest32::new([9u8; 32]);
        let client = ClientSeed::Provided(b"alice".to_vec());
        let first = registry.create_round(seed, &client, 1, 0);
        assert!(first.is_ok());
        let second = registry.create_round(seed, &client, 1, 0);
        assert!(matches!(second, Err(EngineError::AlreadyRevealed(_))));
    }

    #[test]
    fn distinct_nonces_are_independent_rounds() {
        let registry = RoundRegistry::new();
        let seed = Digest32::new([9u8; 32]);
        let client = ClientSeed::Provided(b"alice".to_vec());
        assert!(registry.create_round(seed, &client, 1, 0).is_ok());
        assert!(registry.create_round(seed, &client, 2, 0).is_ok());
    }

    proptest::proptest! {
        /// §8 quantified invariant: `SHA256(houseSeed) == commitHash` for
        /// every commitment, for any 32-byte house seed, not just the fixed
        /// vectors above.
        #[test]
        fn commit_always_satisfies_verify_commit(seed_bytes: [u8; 32]) {
            let seed = Digest32::new(seed_bytes);
            let commitment = commit(seed, 0);
            proptest::prop_assert!(verify_commit(&seed, &commitment.commit_hash));
        }

        /// §8: for any two distinct client seeds mixed with the same house
        /// seed, the combined entropy differs (holds except with negligible
        /// probability).
        #[test]
        fn mixing_differs_for_distinct_client_seeds(
            seed_bytes: [u8; 32],
            a in proptest::collection::vec(proptest::prelude::any::<u8>(), 1..32),
            b in proptest::collection::vec(proptest::prelude::any::<u8>(), 1..32),
        ) {
            proptest::prop_assume!(a != b);
            let seed = Digest32::new(seed_bytes);
            let combined_a = mix(&seed, &ClientSeed::Provided(a));
            let combined_b = mix(&seed, &ClientSeed::Provided(b));
            proptest::prop_assert_ne!(combined_a, combined_b);
        }
    }
}
