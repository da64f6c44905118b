// Path: crates/trifair-types/src/entropy.rs
//! Commitment, theta vector and proof record shapes (§3).

use serde::{Deserialize, Serialize};

/// 32-byte entropy digest, serialized as lowercase hex on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest32(#[serde(with = "hex32")] pub [u8; 32]);

impl Digest32 {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out)?;
        Ok(Self(out))
    }
}

impl std::fmt::Display for Digest32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(&s, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}

/// Triple `{ commitHash, houseSeed, createdAt }` (§3 Commitment).
///
/// Owned by the commitment pool until consumed by a reveal, at which point
/// its `house_seed` is copied into the emitted [`Proof`] and the pool entry
/// is destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commitment {
    pub commit_hash: Digest32,
    pub house_seed: Digest32,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// Three angles in `[0, 2*pi)` derived from an entropy digest (§3 Theta Vector).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThetaVector(pub [f64; 3]);

impl ThetaVector {
    pub fn get(&self, index: usize) -> f64 {
        self.0[index % 3]
    }
}

/// The client-supplied seed, or the absence of one (test mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientSeed {
    Provided(Vec<u8>),
    /// No client seed was supplied; the session is in test mode and the
    /// literal marker `test` stands in for the client seed wherever it is
    /// mixed into a signature.
    TestMode,
}

impl ClientSeed {
    /// The literal marker used in signatures when no client seed was given.
    pub const TEST_MARKER: &'static str = "test";

    pub fn is_test_mode(&self) -> bool {
        matches!(self, ClientSeed::TestMode)
    }

    /// The bytes mixed into HMAC operations: the raw seed, or the literal `"test"`.
    pub fn mixing_bytes(&self) -> &[u8] {
        match self {
            ClientSeed::Provided(bytes) => bytes,
            ClientSeed::TestMode => Self::TEST_MARKER.as_bytes(),
        }
    }

    /// The value recorded in a [`Proof`]: `Some` when provided, `None` in test mode.
    pub fn as_proof_field(&self) -> Option<Vec<u8>> {
        match self {
            ClientSeed::Provided(bytes) => Some(bytes.clone()),
            ClientSeed::TestMode => None,
        }
    }
}

/// 32-byte HMAC mixing house seed and client seed (§3 Combined Entropy).
pub type CombinedEntropy = Digest32;

/// Which grid algorithm a proof's result was produced with (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingMode {
    /// `grid[column][row]` fill honoring wild/bonus/gold spawn rules.
    Grid,
    /// A flat `position[reel]` vector in `[0, symbolsPerReel)`.
    ReelPosition,
}

/// The immutable record produced at the end of a reveal (§3 Proof).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proof {
    /// First 32 hex chars of `SHA256(combinedEntropy || ":" || nonce)`.
    pub proof_id: String,
    pub commit_hash: Digest32,
    pub house_seed: Digest32,
    pub client_seed: Option<Vec<u8>>,
    pub nonce: u64,
    pub theta_vector: ThetaVector,
    pub combined_entropy: CombinedEntropy,
    pub signature: Digest32,
    pub test_mode: bool,
    pub mapping_mode: MappingMode,
    pub version: u16,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Proof {
    pub const CURRENT_VERSION: u16 = 1;

    /// The bytes a verifier mixes in place of `clientSeed-or-"test"`.
    pub fn effective_client_seed(&self) -> Vec<u8> {
        self.client_seed
            .clone()
            .unwrap_or_else(|| ClientSeed::TEST_MARKER.as_bytes().to_vec())
    }
}
