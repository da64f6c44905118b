// Path: crates/trifair-test-utils/src/fixtures.rs
//! Reusable builders for the physics/config types, so every crate's tests
//! construct the same "sample slot machine" instead of redefining it.

use trifair_types::config::{GameConfig, SpawnRates};
use trifair_types::physics::{Body, Configuration, Vector3};

/// A stable, non-degenerate three-body configuration: an asymmetric
/// triangle with small initial velocities, not one of the
/// textbook-symmetric solutions that would make the integrator look more
/// well-behaved than the general case this engine actually relies on.
pub fn sample_configuration() -> Configuration {
    Configuration::new([
        Body {
            mass: 1.0,
            position: Vector3::new(1.0, 0.0, 0.0),
            velocity: Vector3::new(0.0, 0.30, 0.02),
        },
        Body {
            mass: 0.9,
            position: Vector3::new(-0.5, 0.866, 0.1),
            velocity: Vector3::new(-0.26, -0.15, -0.01),
        },
        Body {
            mass: 1.1,
            position: Vector3::new(-0.5, -0.866, -0.1),
            velocity: Vector3::new(0.26, -0.15, 0.01),
        },
    ])
}

/// A small reel game (3 reels, a handful of symbols) sized for fast tests.
pub fn sample_game_config() -> GameConfig {
    GameConfig {
        reel_count: 5,
        symbols_per_reel: 12,
        visible_rows: 3,
        buffer_rows: 2,
        symbols: vec![
            "cherry".to_string(),
            "lemon".to_string(),
            "bell".to_string(),
            "bar".to_string(),
            "seven".to_string(),
        ],
        spawn_rates: SpawnRates {
            wild_chance: 0.05,
            bonus_chance: 0.02,
            gold_chance: 0.01,
        },
        gold_allowed_columns: vec![0, 1, 2, 3, 4],
        physics: Default::default(),
        commitment_ttl_ms: 300_000,
        session_ttl_ms: 900_000,
        max_history_size: 64,
        pool_target_size: 8,
        hash_algorithm: Default::default(),
    }
}
