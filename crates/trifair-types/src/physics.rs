// Path: crates/trifair-types/src/physics.rs
//! Three-body physics types used purely as a chaotic mixing function.
//!
//! None of the types here model real gravitational physics at research
//! fidelity; the integrator that consumes them (`trifair-crypto::physics`)
//! treats them as a reproducible source of chaos, not a simulation of
//! record.

use serde::{Deserialize, Serialize};

/// A single point-mass body: a mass plus a position and velocity vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Mass of the body. Must be strictly positive.
    pub mass: f64,
    /// Position components.
    pub position: Vector3,
    /// Velocity components.
    pub velocity: Vector3,
}

/// A simple 3-component vector of `f64`s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);
}

/// Three bodies plus the two physical constants that govern their
/// interaction. This is the full deterministic input to the integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub bodies: [Body; 3],
    /// Gravitational constant. Reference default `1.0`.
    pub g: f64,
    /// Softening factor `epsilon`, avoids a singular force at `r -> 0`. Reference default `0.01`.
    pub softening: f64,
}

impl Configuration {
    pub const DEFAULT_G: f64 = 1.0;
    pub const DEFAULT_SOFTENING: f64 = 0.01;

    pub fn new(bodies: [Body; 3]) -> Self {
        Self {
            bodies,
            g: Self::DEFAULT_G,
            softening: Self::DEFAULT_SOFTENING,
        }
    }
}

/// The state of the three bodies after a simulation run, plus the
/// identifying tag that was mixed into the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalState {
    pub bodies: [Body; 3],
    /// 16-hex-char tag mixed into the canonical serialization before hashing.
    /// Published alongside the entropy record so a verifier can replay it
    /// literally instead of having to reconstruct it.
    pub simulation_id: String,
}

/// Duration and fixed timestep for an integrator run. `steps = floor(duration / timestep)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub duration: f64,
    pub timestep: f64,
}

impl SimulationParams {
    /// Defaults used when mixing entropy on the reveal path.
    pub const REVEAL: SimulationParams = SimulationParams {
        duration: 3.0,
        timestep: 0.01,
    };

    /// Defaults used when minting a house seed via the physics integrator.
    pub const HOUSE_SEED: SimulationParams = SimulationParams {
        duration: 5.0,
        timestep: 0.01,
    };

    pub fn steps(&self) -> u64 {
        (self.duration / self.timestep).floor() as u64
    }
}
