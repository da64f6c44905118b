// Path: crates/trifair-engine/src/hashchain.rs
//! C6: reverse-generated hash chains for commit-once/verify-many reveals.

use trifair_crypto::hash::sha256;
use trifair_types::entropy::Digest32;
use trifair_types::error::EngineError;
use trifair_types::hashchain::{ChainVerification, HashChain};

/// Length above which a chain is rejected outright (§4.6).
pub const MAX_CHAIN_LENGTH: usize = 10_000_000;

/// Builds `h[L-1] = SHA256(terminalSeed)`, then `h[i] = SHA256(h[i+1])` down
/// to `h[0]`, which is published as the initial commitment.
pub fn build_chain(terminal_seed: &[u8], length: usize) -> Result<HashChain, EngineError> {
    if length == 0 {
        return Err(EngineError::InvalidInput(
            "hash chain length must be at least 1".to_string(),
        ));
    }
    if length > MAX_CHAIN_LENGTH {
        return Err(EngineError::InvalidInput(format!(
            "hash chain length {length} exceeds the maximum of {MAX_CHAIN_LENGTH}"
        )));
    }

    let mut links = vec![Digest32::new([0u8; 32]); length];
    let mut current = Digest32::new(sha256(terminal_seed));
    for slot in links.iter_mut().rev() {
        *slot = current;
        current = Digest32::new(sha256(current.as_bytes()));
    }
    Ok(HashChain { links })
}

/// Checks `SHA256(h[k]) == h[k-1]` forward from `k = 1`, matching the order
/// links are actually revealed in. Stops and reports the first mismatch
/// rather than scanning the whole chain, since a caller revealing `h[k]`
/// only needs to know whether this new link extends the verified prefix.
pub fn verify_chain(chain: &HashChain) -> ChainVerification {
    for k in 1..chain.len() {
        let (previous, current) = match (chain.link(k - 1), chain.link(k)) {
            (Some(p), Some(c)) => (p, c),
            _ => {
                return ChainVerification {
                    valid: false,
                    invalid_index: Some(k),
                }
            }
        };
        if sha256(current.as_bytes()) != *previous.as_bytes() {
            return ChainVerification {
                valid: false,
                invalid_index: Some(k),
            };
        }
    }
    ChainVerification {
        valid: true,
        invalid_index: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_of_length_one_is_just_the_terminal_hash() {
        let chain = build_chain(b"seed", 1).expect("valid length");
        assert_eq!(chain.len(), 1);
        assert_eq!(
            chain.commitment().expect("non-empty").as_bytes(),
            &sha256(b"seed")
        );
        assert!(verify_chain(&chain).valid);
    }

    #[test]
    fn chain_verifies_clean() {
        let chain = build_chain(b"terminal-seed", 20).expect("valid length");
        let verification = verify_chain(&chain);
        assert!(verification.valid);
        assert_eq!(verification.invalid_index, None);
    }

    #[test]
    fn tampering_one_link_is_detected_at_that_index() {
        let mut chain = build_chain(b"terminal-seed", 20).expect("valid length");
        let mut tampered = *chain.link(10).expect("index in range").as_bytes();
        tampered[0] ^= 0x01;
        chain.links[10] = Digest32::new(tampered);

        let verification = verify_chain(&chain);
        assert!(!verification.valid);
        assert_eq!(verification.invalid_index, Some(10));
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(build_chain(b"seed", 0).is_err());
    }

    #[test]
    fn excessive_length_is_rejected() {
        assert!(build_chain(b"seed", MAX_CHAIN_LENGTH + 1).is_err());
    }
}
