// Path: crates/trifair-types/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

//! # Trifair Types
//!
//! Core data structures, configuration surface, and error types shared by the
//! three-body provably-fair entropy engine. This crate has no I/O and no
//! cryptographic implementation of its own — it only defines the shapes that
//! `trifair-crypto` and `trifair-engine` operate on.

/// Physics bodies and simulation configuration (§3 Body / Configuration).
pub mod physics;
/// Commitment, theta vector, combined entropy and proof record shapes (§3).
pub mod entropy;
/// Symbol grid and reel-position output shapes (§3 Symbol Grid).
pub mod grid;
/// Session record, state enum and transition history (§3 Session).
pub mod session;
/// Hash-chain record shape (§4.6).
pub mod hashchain;
/// The enumerated configuration surface (§6).
pub mod config;
/// Error kinds shared across the engine (§7).
pub mod error;

pub mod prelude {
    //! Re-exports of the types most commonly needed by downstream crates.
    pub use crate::config::*;
    pub use crate::entropy::*;
    pub use crate::error::*;
    pub use crate::grid::*;
    pub use crate::hashchain::*;
    pub use crate::physics::*;
    pub use crate::session::*;
}
