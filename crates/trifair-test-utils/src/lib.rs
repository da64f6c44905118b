// Path: crates/trifair-test-utils/src/lib.rs
//! # Trifair Test Utilities
//!
//! Utilities shared by this workspace's test suites: a deterministic RNG
//! for generating reproducible client seeds/house seeds, assertion macros,
//! and fixture builders for the physics/config types.

pub mod assertions;
pub mod fixtures;
pub mod randomness;
