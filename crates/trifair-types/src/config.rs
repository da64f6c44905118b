// Path: crates/trifair-types/src/config.rs
//! The enumerated configuration surface (§6).

use serde::{Deserialize, Serialize};

use crate::physics::SimulationParams;

/// Probabilities governing wild/bonus/gold spawn rules (§6 `spawnRates`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRates {
    #[serde(default)]
    pub wild_chance: f64,
    #[serde(default)]
    pub bonus_chance: f64,
    #[serde(default)]
    pub gold_chance: f64,
}

impl Default for SpawnRates {
    fn default() -> Self {
        Self {
            wild_chance: 0.0,
            bonus_chance: 0.0,
            gold_chance: 0.0,
        }
    }
}

/// Which hash algorithm HKDF uses (§6 `hashAlgorithm`). The proof path
/// itself is always SHA-256; this only selects the algorithm for
/// `trifair_crypto::kdf` callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Sha256
    }
}

fn default_duration_reveal() -> f64 {
    SimulationParams::REVEAL.duration
}
fn default_timestep() -> f64 {
    SimulationParams::REVEAL.timestep
}
fn default_g() -> f64 {
    1.0
}
fn default_softening() -> f64 {
    0.01
}

/// Physics integrator parameters (§6 `physics.*`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    #[serde(default = "default_duration_reveal")]
    pub duration: f64,
    #[serde(default = "default_timestep")]
    pub timestep: f64,
    #[serde(default = "default_g")]
    pub g: f64,
    #[serde(default = "default_softening")]
    pub softening: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            duration: default_duration_reveal(),
            timestep: default_timestep(),
            g: default_g(),
            softening: default_softening(),
        }
    }
}

fn default_visible_rows() -> u32 {
    6
}
fn default_buffer_rows() -> u32 {
    4
}
fn default_commitment_ttl_ms() -> u64 {
    5 * 60 * 1000
}
fn default_session_ttl_ms() -> u64 {
    15 * 60 * 1000
}
fn default_max_history_size() -> usize {
    64
}
fn default_pool_target_size() -> usize {
    100
}

/// The full configuration surface consumed by the engine (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of columns, `3..=8`.
    pub reel_count: u32,
    /// `>= 1`, used in reel-position mode.
    pub symbols_per_reel: u32,
    #[serde(default = "default_visible_rows")]
    pub visible_rows: u32,
    #[serde(default = "default_buffer_rows")]
    pub buffer_rows: u32,
    /// Symbol pool; must include `wild` and `bonus` if those spawn rules apply.
    pub symbols: Vec<String>,
    #[serde(default)]
    pub spawn_rates: SpawnRates,
    /// Subset of `0..reelCount-1`.
    #[serde(default)]
    pub gold_allowed_columns: Vec<u32>,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default = "default_commitment_ttl_ms")]
    pub commitment_ttl_ms: u64,
    #[serde(default = "default_session_ttl_ms")]
    pub session_ttl_ms: u64,
    #[serde(default = "default_max_history_size")]
    pub max_history_size: usize,
    #[serde(default = "default_pool_target_size")]
    pub pool_target_size: usize,
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

impl GameConfig {
    pub fn rows(&self) -> u32 {
        self.visible_rows + self.buffer_rows
    }

    /// §8 boundary: `reelCount` must be in `3..=8`.
    pub fn validate(&self) -> Result<(), String> {
        if !(3..=8).contains(&self.reel_count) {
            return Err(format!(
                "reel_count must be in 3..=8, got {}",
                self.reel_count
            ));
        }
        if self.symbols_per_reel < 1 {
            return Err("symbols_per_reel must be >= 1".to_string());
        }
        for c in &self.gold_allowed_columns {
            if *c >= self.reel_count {
                return Err(format!(
                    "gold_allowed_columns entry {c} out of range for reel_count {}",
                    self.reel_count
                ));
            }
        }
        for (label, rate) in [
            ("wild_chance", self.spawn_rates.wild_chance),
            ("bonus_chance", self.spawn_rates.bonus_chance),
            ("gold_chance", self.spawn_rates.gold_chance),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("{label} must be in [0, 1], got {rate}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> GameConfig {
        GameConfig {
            reel_count: 5,
            symbols_per_reel: 20,
            visible_rows: default_visible_rows(),
            buffer_rows: default_buffer_rows(),
            symbols: vec!["cherry".to_string(), "bar".to_string()],
            spawn_rates: SpawnRates::default(),
            gold_allowed_columns: vec![],
            physics: PhysicsConfig::default(),
            commitment_ttl_ms: default_commitment_ttl_ms(),
            session_ttl_ms: default_session_ttl_ms(),
            max_history_size: default_max_history_size(),
            pool_target_size: default_pool_target_size(),
            hash_algorithm: HashAlgorithm::default(),
        }
    }

    /// The operator-facing config surface (§6) is expected to arrive as a
    /// TOML file, the same way the host process's own configuration does;
    /// round-tripping through `toml` here catches drift between the struct
    /// and what an operator would actually write on disk.
    #[test]
    fn game_config_round_trips_through_toml() {
        let config = minimal_config();
        let serialized = toml::to_string(&config).expect("serializable");
        let parsed: GameConfig = toml::from_str(&serialized).expect("deserializable");
        assert_eq!(parsed.reel_count, config.reel_count);
        assert_eq!(parsed.symbols, config.symbols);
        assert_eq!(parsed.hash_algorithm, config.hash_algorithm);
    }

    #[test]
    fn reel_count_out_of_range_fails_validation() {
        let mut config = minimal_config();
        config.reel_count = 2;
        assert!(config.validate().is_err());
        config.reel_count = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn reel_count_boundaries_pass_validation() {
        let mut config = minimal_config();
        config.reel_count = 3;
        assert!(config.validate().is_ok());
        config.reel_count = 8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn gold_allowed_column_out_of_range_fails_validation() {
        let mut config = minimal_config();
        config.gold_allowed_columns = vec![0, 5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn spawn_rate_out_of_unit_interval_fails_validation() {
        let mut config = minimal_config();
        config.spawn_rates.wild_chance = 1.5;
        assert!(config.validate().is_err());
    }
}
