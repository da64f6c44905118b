// Path: crates/trifair-crypto/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

//! # Trifair Crypto
//!
//! The deterministic entropy pipeline: a seeded three-body integrator that
//! boils a configuration down to a 32-byte digest (C1), the SHA-256 /
//! HMAC-SHA-256 / HKDF primitives built on top of it (C2), and the
//! commit/reveal/mix operations that turn a digest into combined entropy
//! (C3).
//!
//! Nothing in this crate performs I/O. Suspension (if any implementation
//! chooses to offload the integrator to a worker) is the caller's concern,
//! not this crate's.

/// C1: the seeded three-body RK4 integrator and its canonical digest.
pub mod physics;
/// C2: SHA-256, HMAC-SHA-256, and HKDF (RFC 5869) primitives.
pub mod hash;
/// C3: commit / verify-commit / mix, and the reveal-once `createRound` helper.
pub mod commitment;
