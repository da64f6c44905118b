// Path: crates/trifair-crypto/src/physics.rs
//! C1: the seeded three-body integrator and its canonical digest.
//!
//! This is not a research-grade gravity simulator — it is a reproducible
//! chaotic mixing function. The only property that matters is bit-exact
//! reproducibility of the final state across runs on IEEE-754-compliant
//! hardware, for identical inputs.
//!
//! To keep that contract: never call `f64::mul_add` anywhere in this
//! module (it changes rounding relative to separate multiply/add), and
//! always sum forces in a fixed body-index order rather than through an
//! unordered collection. Energy drift is logged at `warn` but never
//! fails the run — the digest does not depend on energy conservation.

use sha2::{Digest, Sha256};
use trifair_types::error::CryptoError;
use trifair_types::physics::{Body, Configuration, FinalState, SimulationParams, Vector3};

/// Runs a fixed-step RK4 integration of `configuration` for
/// `floor(params.duration / params.timestep)` steps and returns the final
/// body states, tagged with `simulation_id`.
///
/// `simulation_id` is not generated here: it is supplied by the caller
/// (minted from creation-time nonces when minting a house seed, or replayed
/// literally from the published entropy record when verifying) so that
/// `simulate` itself stays a pure function of its explicit arguments.
pub fn simulate(
    configuration: &Configuration,
    params: SimulationParams,
    simulation_id: &str,
) -> Result<FinalState, CryptoError> {
    let steps = params.steps();
    let mut bodies = configuration.bodies;

    for _ in 0..steps {
        bodies = rk4_step(&bodies, configuration.g, configuration.softening, params.timestep)?;
    }

    for body in &bodies {
        if !is_finite_body(body) {
            return Err(CryptoError::NonFiniteState);
        }
    }

    let energy_before = total_energy(&configuration.bodies, configuration.g, configuration.softening);
    let energy_after = total_energy(&bodies, configuration.g, configuration.softening);
    let drift = if energy_before.abs() > f64::EPSILON {
        ((energy_after - energy_before) / energy_before).abs()
    } else {
        (energy_after - energy_before).abs()
    };
    if drift > ENERGY_DRIFT_WARN_THRESHOLD {
        tracing::warn!(
            drift,
            simulation_id,
            "three-body integrator energy drift above warning threshold"
        );
    }

    Ok(FinalState {
        bodies,
        simulation_id: simulation_id.to_string(),
    })
}

/// Informational only; leave as a logged warning, never a gate on any
/// decision (§9 open question).
const ENERGY_DRIFT_WARN_THRESHOLD: f64 = 0.05;

#[derive(Clone, Copy)]
struct Derivative {
    velocity: [Vector3; 3],
    acceleration: [Vector3; 3],
}

fn is_finite_body(body: &Body) -> bool {
    body.position.x.is_finite()
        && body.position.y.is_finite()
        && body.position.z.is_finite()
        && body.velocity.x.is_finite()
        && body.velocity.y.is_finite()
        && body.velocity.z.is_finite()
}

fn sub(a: Vector3, b: Vector3) -> Vector3 {
    Vector3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

fn add(a: Vector3, b: Vector3) -> Vector3 {
    Vector3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

fn scale(a: Vector3, s: f64) -> Vector3 {
    Vector3::new(a.x * s, a.y * s, a.z * s)
}

fn norm_sq(a: Vector3) -> f64 {
    a.x * a.x + a.y * a.y + a.z * a.z
}

/// `F_ij = G * m_j * r_ij / (|r_ij|^2 + eps^2)^(3/2)`, summed over the two
/// other bodies in fixed index order (never via an unordered iterator).
fn accelerations(bodies: &[Body; 3], g: f64, softening: f64) -> [Vector3; 3] {
    let mut acc = [Vector3::ZERO; 3];
    for i in 0..3 {
        let mut total = Vector3::ZERO;
        for j in 0..3 {
            if i == j {
                continue;
            }
            let r_ij = sub(bodies[j].position, bodies[i].position);
            let denom = (norm_sq(r_ij) + softening * softening).powf(1.5);
            let factor = g * bodies[j].mass / denom;
            total = add(total, scale(r_ij, factor));
        }
        acc[i] = total;
    }
    acc
}

fn derivative(bodies: &[Body; 3], g: f64, softening: f64) -> Derivative {
    let acceleration = accelerations(bodies, g, softening);
    let mut velocity = [Vector3::ZERO; 3];
    for i in 0..3 {
        velocity[i] = bodies[i].velocity;
    }
    Derivative {
        velocity,
        acceleration,
    }
}

fn displaced(bodies: &[Body; 3], d: &Derivative, dt: f64) -> [Body; 3] {
    let mut out = *bodies;
    for i in 0..3 {
        out[i].position = add(bodies[i].position, scale(d.velocity[i], dt));
        out[i].velocity = add(bodies[i].velocity, scale(d.acceleration[i], dt));
    }
    out
}

fn rk4_step(
    bodies: &[Body; 3],
    g: f64,
    softening: f64,
    dt: f64,
) -> Result<[Body; 3], CryptoError> {
    let k1 = derivative(bodies, g, softening);
    let k2 = derivative(&displaced(bodies, &k1, dt / 2.0), g, softening);
    let k3 = derivative(&displaced(bodies, &k2, dt / 2.0), g, softening);
    let k4 = derivative(&displaced(bodies, &k3, dt), g, softening);

    let mut out = *bodies;
    for i in 0..3 {
        let dv = scale(
            add(
                add(k1.velocity[i], scale(k2.velocity[i], 2.0)),
                add(scale(k3.velocity[i], 2.0), k4.velocity[i]),
            ),
            dt / 6.0,
        );
        let da = scale(
            add(
                add(k1.acceleration[i], scale(k2.acceleration[i], 2.0)),
                add(scale(k3.acceleration[i], 2.0), k4.acceleration[i]),
            ),
            dt / 6.0,
        );
        out[i].position = add(bodies[i].position, dv);
        out[i].velocity = add(bodies[i].velocity, da);
    }
    Ok(out)
}

fn total_energy(bodies: &[Body; 3], g: f64, softening: f64) -> f64 {
    let mut kinetic = 0.0;
    for body in bodies {
        kinetic += 0.5 * body.mass * norm_sq(body.velocity);
    }
    let mut potential = 0.0;
    for i in 0..3 {
        for j in (i + 1)..3 {
            let r_ij = sub(bodies[j].position, bodies[i].position);
            let dist = (norm_sq(r_ij) + softening * softening).sqrt();
            potential -= g * bodies[i].mass * bodies[j].mass / dist;
        }
    }
    kinetic + potential
}

/// Expands a 32-byte entropy seed into a three-body [`Configuration`] via
/// HKDF (C2), so the reveal-path physics run (§4.1, `duration=3.0` defaults)
/// has deterministic initial conditions derived from the round's own
/// `houseSeed`/`clientSeed`/nonce rather than a fixed starting triangle.
/// Masses land in `(0.5, 1.5]`, positions in `[-1, 1]`, velocities in
/// `[-0.3, 0.3]` — wide enough to keep the integrator chaotic, narrow enough
/// to stay clear of numerically degenerate near-collision configurations.
pub fn configuration_from_seed(seed: &[u8; 32]) -> Result<Configuration, CryptoError> {
    use crate::hash::{hkdf_expand_sha256, hkdf_extract_sha256};

    let prk = hkdf_extract_sha256(b"three-body-configuration", seed);
    let okm = hkdf_expand_sha256(&prk, b"bodies", 21 * 8)?;

    let mut values = [0.0_f64; 21];
    for (slot, chunk) in values.iter_mut().zip(okm.chunks_exact(8)) {
        let bytes: [u8; 8] = chunk.try_into().map_err(|_| CryptoError::NonFiniteState)?;
        *slot = u64::from_be_bytes(bytes) as f64 / u64::MAX as f64;
    }

    let mut bodies = [Body {
        mass: 1.0,
        position: Vector3::ZERO,
        velocity: Vector3::ZERO,
    }; 3];
    for (i, body) in bodies.iter_mut().enumerate() {
        let base = i * 7;
        let unit = |n: usize| values[base + n];
        body.mass = 0.5 + unit(0);
        body.position = Vector3::new(
            unit(1) * 2.0 - 1.0,
            unit(2) * 2.0 - 1.0,
            unit(3) * 2.0 - 1.0,
        );
        body.velocity = Vector3::new(
            unit(4) * 0.6 - 0.3,
            unit(5) * 0.6 - 0.3,
            unit(6) * 0.6 - 0.3,
        );
    }

    Ok(Configuration::new(bodies))
}

/// Canonical decimal-exponent serialization of one `f64`: a 15-significant-digit
/// mantissa and a signed, zero-padded exponent, e.g. `1.00000000000000e+00`.
fn canonical_f64(v: f64) -> Result<String, CryptoError> {
    if v == 0.0 {
        let sign = if v.is_sign_negative() { "-" } else { "" };
        return Ok(format!("{sign}0.00000000000000e+00"));
    }
    let formatted = format!("{v:.14e}");
    let (mantissa, exponent) = formatted
        .split_once('e')
        .ok_or(CryptoError::NonFiniteState)?;
    let exponent: i64 = exponent.parse().map_err(|_| CryptoError::NonFiniteState)?;
    let sign = if exponent < 0 { "-" } else { "+" };
    Ok(format!("{mantissa}e{sign}{:02}", exponent.abs()))
}

/// Canonical serialization of a final state: for each body in order,
/// `x:y:z:vx:vy:vz`, each component in [`canonical_f64`] form, joined by `:`.
pub fn canonical_serialize(state: &FinalState) -> Result<String, CryptoError> {
    let mut fields = Vec::with_capacity(18);
    for body in &state.bodies {
        for component in [
            body.position.x,
            body.position.y,
            body.position.z,
            body.velocity.x,
            body.velocity.y,
            body.velocity.z,
        ] {
            fields.push(canonical_f64(component)?);
        }
    }
    Ok(fields.join(":"))
}

/// `digest = SHA256(canonical || ":" || simulationId)` (§3 Entropy Digest, §4.1).
pub fn digest(state: &FinalState) -> Result<[u8; 32], CryptoError> {
    let canonical = canonical_serialize(state)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update(b":");
    hasher.update(state.simulation_id.as_bytes());
    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trifair_types::physics::Vector3;

    fn sample_configuration() -> Configuration {
        Configuration {
            bodies: [
                Body {
                    mass: 1.0,
                    position: Vector3::new(1.0, 0.0, 0.0),
                    velocity: Vector3::new(0.0, 0.3, 0.0),
                },
                Body {
                    mass: 1.0,
                    position: Vector3::new(-0.5, 0.866, 0.0),
                    velocity: Vector3::new(-0.26, -0.15, 0.0),
                },
                Body {
                    mass: 1.0,
                    position: Vector3::new(-0.5, -0.866, 0.0),
                    velocity: Vector3::new(0.26, -0.15, 0.0),
                },
            ],
            g: Configuration::DEFAULT_G,
            softening: Configuration::DEFAULT_SOFTENING,
        }
    }

    #[test]
    fn digest_is_a_pure_function_of_its_inputs() {
        let cfg = sample_configuration();
        let params = SimulationParams::REVEAL;
        let a = simulate(&cfg, params, "deadbeefdeadbeef").and_then(|s| digest(&s));
        let b = simulate(&cfg, params, "deadbeefdeadbeef").and_then(|s| digest(&s));
        assert_eq!(a.expect("finite"), b.expect("finite"));
    }

    #[test]
    fn different_simulation_id_changes_digest() {
        let cfg = sample_configuration();
        let params = SimulationParams::REVEAL;
        let a = simulate(&cfg, params, "0000000000000000").and_then(|s| digest(&s));
        let b = simulate(&cfg, params, "1111111111111111").and_then(|s| digest(&s));
        assert_ne!(a.expect("finite"), b.expect("finite"));
    }

    #[test]
    fn canonical_f64_matches_expected_shape() {
        let s = canonical_f64(1.0).expect("finite");
        assert_eq!(s, "1.00000000000000e+00");
        let s = canonical_f64(-0.005).expect("finite");
        assert!(s.starts_with('-'));
        assert!(s.contains("e-03"));
    }

    #[test]
    fn steps_is_floor_of_duration_over_timestep() {
        let params = SimulationParams {
            duration: 3.0,
            timestep: 0.01,
        };
        assert_eq!(params.steps(), 300);
    }

    #[test]
    fn configuration_from_seed_is_deterministic_and_non_degenerate() {
        let seed = [0x5a_u8; 32];
        let a = configuration_from_seed(&seed).expect("valid seed");
        let b = configuration_from_seed(&seed).expect("valid seed");
        for i in 0..3 {
            assert_eq!(a.bodies[i].mass, b.bodies[i].mass);
            assert!(a.bodies[i].mass > 0.0);
        }
        assert_eq!(canonical_serialize_bodies(&a), canonical_serialize_bodies(&b));
    }

    #[test]
    fn configuration_from_seed_differs_by_seed() {
        let a = configuration_from_seed(&[0x01_u8; 32]).expect("valid seed");
        let b = configuration_from_seed(&[0x02_u8; 32]).expect("valid seed");
        assert_ne!(canonical_serialize_bodies(&a), canonical_serialize_bodies(&b));
    }

    fn canonical_serialize_bodies(configuration: &Configuration) -> String {
        configuration
            .bodies
            .iter()
            .map(|b| format!("{}:{}:{}:{}", b.mass, b.position.x, b.position.y, b.position.z))
            .collect::<Vec<_>>()
            .join("|")
    }
}
