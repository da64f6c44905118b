// Path: crates/trifair-engine/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

//! # Trifair Engine
//!
//! The stateful half of the service: entropy-to-grid mapping (C4), proof
//! assembly (C5), hash chains (C6), the commitment pool (C7), the session
//! state machine (C8), the cache façade (C9), the offline verifier (C10),
//! and [`engine::Engine`], which wires all of the above around a server
//! secret and a game configuration.

pub mod cache;
pub mod engine;
pub mod hashchain;
pub mod mapper;
pub mod pool;
pub mod proof;
pub mod session;
pub mod verify;
