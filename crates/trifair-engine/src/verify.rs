// Path: crates/trifair-engine/src/verify.rs
//! C10: the offline Verify API. A single pure function over a Proof and the
//! values it claims to be consistent with — no I/O, no session, no pool.
//! This is the surface an auditor re-implements independently to check the
//! engine's own output against.

use trifair_types::config::GameConfig;
use trifair_types::entropy::{ClientSeed, Digest32, Proof};
use trifair_types::grid::{ReelPositions, SymbolGrid};

use crate::mapper;
use crate::proof::{proof_id, sign};

/// What the operator published alongside a `Proof`, to be re-derived and
/// compared against during verification.
#[derive(Debug, Clone)]
pub enum PublishedResult {
    Grid(SymbolGrid),
    ReelPositions(ReelPositions),
}

/// The four independent checks from §4.10, plus their conjunction. A `None`
/// signature check means the verifier had no server secret to check against,
/// not that the signature was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyReport {
    pub commitment_valid: bool,
    pub entropy_valid: bool,
    pub signature_valid: Option<bool>,
    pub result_valid: bool,
    pub valid: bool,
}

fn effective_client_seed(proof: &Proof) -> ClientSeed {
    match &proof.client_seed {
        Some(bytes) => ClientSeed::Provided(bytes.clone()),
        None => ClientSeed::TestMode,
    }
}

/// Runs all four checks and folds them into `valid` (§4.10). `known_commit_hash`
/// is what the verifier independently recorded at commit time; pass `None`
/// only when re-checking a proof whose commitment you already trust.
/// `server_secret` is optional since a third-party auditor will not have it;
/// the signature check is simply skipped, not failed, in that case.
pub fn verify(
    proof: &Proof,
    known_commit_hash: Option<&Digest32>,
    server_secret: Option<&[u8]>,
    config: &GameConfig,
    published: &PublishedResult,
) -> VerifyReport {
    let commitment_valid = known_commit_hash.map_or(true, |expected| *expected == proof.commit_hash);

    let client_seed = effective_client_seed(proof);
    let recomputed_combined =
        trifair_crypto::commitment::mix(&proof.house_seed, &client_seed);
    let entropy_valid = recomputed_combined == proof.combined_entropy;

    let signature_valid = server_secret.map(|secret| {
        let id = proof_id(&proof.combined_entropy, proof.nonce);
        let expected = sign(secret, &id, &proof.commit_hash, &client_seed, proof.nonce);
        id == proof.proof_id && expected == proof.signature
    });

    let result_valid = match published {
        PublishedResult::Grid(published_grid) => {
            mapper::map_grid(&proof.combined_entropy, config)
                .map(|recomputed| &recomputed == published_grid)
                .unwrap_or(false)
        }
        PublishedResult::ReelPositions(published_positions) => {
            mapper::map_reel_positions(
                &proof.combined_entropy,
                &client_seed,
                proof.nonce,
                config.reel_count,
                config.symbols_per_reel,
            )
            .map(|recomputed| &recomputed == published_positions)
            .unwrap_or(false)
        }
    };

    let valid = commitment_valid
        && entropy_valid
        && signature_valid.unwrap_or(true)
        && result_valid;

    VerifyReport {
        commitment_valid,
        entropy_valid,
        signature_valid,
        result_valid,
        valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trifair_test_utils::fixtures::sample_game_config;
    use trifair_types::entropy::{Commitment, MappingMode};

    fn build_sample_proof(config: &GameConfig, client_seed: ClientSeed, nonce: u64) -> (Proof, SymbolGrid) {
        let house_seed = Digest32::new([0x07; 32]);
        let commitment = Commitment {
            commit_hash: Digest32::new(trifair_crypto::hash::sha256(house_seed.as_bytes())),
            house_seed,
            created_at: 0,
        };
        let combined = trifair_crypto::commitment::mix(&house_seed, &client_seed);
        let entropy_digest = Digest32::new([0x42; 32]);
        let proof = crate::proof::build_proof(
            &commitment,
            &client_seed,
            nonce,
            &entropy_digest,
            &combined,
            b"server-secret",
            MappingMode::Grid,
            1_000,
        );
        let grid = mapper::map_grid(&combined, config).expect("mapping succeeds");
        (proof, grid)
    }

    #[test]
    fn build_then_verify_all_pass_with_server_secret() {
        let config = sample_game_config();
        let client_seed = ClientSeed::Provided(b"alice".to_vec());
        let (proof, grid) = build_sample_proof(&config, client_seed, 1);

        let report = verify(
            &proof,
            Some(&proof.commit_hash),
            Some(b"server-secret"),
            &config,
            &PublishedResult::Grid(grid),
        );

        assert!(report.commitment_valid);
        assert!(report.entropy_valid);
        assert_eq!(report.signature_valid, Some(true));
        assert!(report.result_valid);
        assert!(report.valid);
    }

    #[test]
    fn verify_without_server_secret_is_unverified_not_failed() {
        let config = sample_game_config();
        let (proof, grid) = build_sample_proof(&config, ClientSeed::TestMode, 1);

        let report = verify(
            &proof,
            Some(&proof.commit_hash),
            None,
            &config,
            &PublishedResult::Grid(grid),
        );

        assert_eq!(report.signature_valid, None);
        assert!(report.valid);
    }

    #[test]
    fn tampered_combined_entropy_fails_entropy_check() {
        let config = sample_game_config();
        let (mut proof, grid) = build_sample_proof(&config, ClientSeed::TestMode, 1);
        let mut tampered = *proof.combined_entropy.as_bytes();
        tampered[0] ^= 0x01;
        proof.combined_entropy = Digest32::new(tampered);

        let report = verify(
            &proof,
            Some(&proof.commit_hash),
            Some(b"server-secret"),
            &config,
            &PublishedResult::Grid(grid),
        );

        assert!(!report.entropy_valid);
        assert!(!report.valid);
    }

    #[test]
    fn wrong_commit_hash_fails_commitment_check_only() {
        let config = sample_game_config();
        let (proof, grid) = build_sample_proof(&config, ClientSeed::TestMode, 1);
        let wrong = Digest32::new([0xff; 32]);

        let report = verify(
            &proof,
            Some(&wrong),
            Some(b"server-secret"),
            &config,
            &PublishedResult::Grid(grid),
        );

        assert!(!report.commitment_valid);
        assert!(report.entropy_valid);
        assert!(!report.valid);
    }

    #[test]
    fn tampered_published_grid_fails_result_check() {
        let config = sample_game_config();
        let (proof, mut grid) = build_sample_proof(&config, ClientSeed::TestMode, 1);
        if let Some(column) = grid.columns.first_mut() {
            if let Some(cell) = column.first_mut() {
                *cell = trifair_types::grid::Symbol::wild();
            }
        }

        let report = verify(
            &proof,
            Some(&proof.commit_hash),
            Some(b"server-secret"),
            &config,
            &PublishedResult::Grid(grid),
        );

        assert!(!report.result_valid);
        assert!(!report.valid);
    }
}
