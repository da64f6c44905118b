// Path: crates/trifair-types/src/error.rs
//! Error kinds shared across the engine (§7).

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error,
/// independent of its `Display` message. Callers that forward errors across
/// a process boundary (e.g. the out-of-scope HTTP layer) should key off
/// `code()`, not the formatted message.
pub trait ErrorCode {
    fn code(&self) -> &'static str;
}

/// Errors surfaced by the entropy-and-proof engine and the session state
/// machine (§7). The engine never panics on bad caller input; every failure
/// mode here is a returned value.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Empty seed, out-of-range reel count, out-of-range chain length,
    /// non-hex where hex required.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested event is not legal from the session's current state.
    #[error("invalid transition: event {event} not allowed from state {from:?}")]
    InvalidTransition {
        event: String,
        from: crate::session::SessionState,
    },

    /// Session or commitment absent from both cache and store.
    #[error("not found: {0}")]
    NotFound(String),

    /// A second reveal attempt was made against an already-revealed round.
    #[error("round already revealed: {0}")]
    AlreadyRevealed(String),

    /// A verification sub-check failed. Carries the breakdown so the caller
    /// can tell which invariant broke; this variant is only raised when a
    /// caller asks the engine to *enforce* a passing proof rather than just
    /// report one (the offline verifier itself never raises this).
    #[error("proof tampered: {0}")]
    Tampered(String),

    /// Physics integrator produced a non-finite value, HMAC key length
    /// exceeded a platform limit, or another invariant the caller cannot
    /// have triggered directly was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "ENGINE_INVALID_INPUT",
            EngineError::InvalidTransition { .. } => "ENGINE_INVALID_TRANSITION",
            EngineError::NotFound(_) => "ENGINE_NOT_FOUND",
            EngineError::AlreadyRevealed(_) => "ENGINE_ALREADY_REVEALED",
            EngineError::Tampered(_) => "ENGINE_TAMPERED",
            EngineError::Internal(_) => "ENGINE_INTERNAL",
        }
    }
}

/// Errors from the cryptographic/physics primitives (hash, HMAC, HKDF,
/// integrator, commitment core).
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: {0}")]
    InvalidKeyLength(String),
    #[error("HKDF output length {requested} exceeds 255 * hash_len ({max})")]
    HkdfLengthExceeded { requested: usize, max: usize },
    #[error("non-finite value produced by the physics integrator")]
    NonFiniteState,
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            CryptoError::InvalidKeyLength(_) => "CRYPTO_INVALID_KEY_LENGTH",
            CryptoError::HkdfLengthExceeded { .. } => "CRYPTO_HKDF_LENGTH_EXCEEDED",
            CryptoError::NonFiniteState => "CRYPTO_NON_FINITE_STATE",
            CryptoError::InvalidHex(_) => "CRYPTO_INVALID_HEX",
        }
    }
}

impl From<CryptoError> for EngineError {
    fn from(e: CryptoError) -> Self {
        EngineError::Internal(e.to_string())
    }
}
