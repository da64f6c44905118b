// Path: crates/trifair-types/src/session.rs
//! Session record, state enum, and transition events (§3 Session, §4.8, §9).
//!
//! The source this system was distilled from carries transition payloads as
//! ad-hoc string-keyed maps. Per the redesign notes this is replaced with a
//! tagged variant — one case per event, each with its own typed payload —
//! so the state machine can pattern-match instead of stringly-typed lookups.

use serde::{Deserialize, Serialize};

use crate::entropy::{ClientSeed, Digest32, Proof};

/// `state` field of a Session (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Init,
    AwaitingBet,
    EntropyRequested,
    Spinning,
    Complete,
    Error,
    Cancelled,
    Expired,
}

impl SessionState {
    /// States from which `CANCEL` and `EXPIRE` are always legal (§4.8: "any non-terminal").
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Cancelled | SessionState::Expired
        )
    }
}

/// Bet details carried by `PLACE_BET` (§4.8 event-to-field table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetPayload {
    pub amount: u128,
    pub currency: String,
    pub client_seed: ClientSeed,
    pub nonce: u64,
}

/// Entropy digest carried by `ENTROPY_RECEIVED`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntropyPayload {
    pub digest: Digest32,
}

/// Spin result carried by `SPIN_COMPLETE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinResultPayload {
    pub proof: Proof,
}

/// The tagged events accepted by the session state machine (§4.8).
///
/// `Error` and `Cancel` carry a free-form reason; `Custom` is the catch-all
/// bucket for any event without a dedicated field mapping, preserving
/// extensibility without resurrecting a stringly-typed map for the events
/// that *do* have a known shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    Start,
    PlaceBet(BetPayload),
    EntropyReceived(EntropyPayload),
    SpinComplete(SpinResultPayload),
    Reset,
    Error(String),
    Cancel,
    Expire,
    Custom { name: String, payload: serde_json::Value },
}

impl SessionEvent {
    /// The event name, used for `history` entries and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Start => "START",
            SessionEvent::PlaceBet(_) => "PLACE_BET",
            SessionEvent::EntropyReceived(_) => "ENTROPY_RECEIVED",
            SessionEvent::SpinComplete(_) => "SPIN_COMPLETE",
            SessionEvent::Reset => "RESET",
            SessionEvent::Error(_) => "ERROR",
            SessionEvent::Cancel => "CANCEL",
            SessionEvent::Expire => "EXPIRE",
            SessionEvent::Custom { .. } => "CUSTOM",
        }
    }
}

/// A single append-only transition record (§3 `history`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub from: SessionState,
    pub to: SessionState,
    pub event: String,
    /// Milliseconds since the Unix epoch.
    pub at: u64,
    pub payload: Option<serde_json::Value>,
}

/// Everything accumulated into `Session.data` over the session's lifetime.
/// Each field is populated by exactly one event per the §4.8 field table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub bet: Option<BetPayload>,
    pub last_entropy_digest: Option<Digest32>,
    pub last_result: Option<Proof>,
    pub custom: std::collections::BTreeMap<String, serde_json::Value>,
}

/// A session record (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    pub state: SessionState,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    pub updated_at: u64,
    pub expires_at: u64,
    pub data: SessionData,
    pub history: Vec<HistoryEntry>,
    pub error: Option<String>,
}

impl Session {
    pub fn new(id: String, user_id: String, game_id: String, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            id,
            user_id,
            game_id,
            state: SessionState::Init,
            created_at: now_ms,
            updated_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
            data: SessionData::default(),
            history: Vec::new(),
            error: None,
        }
    }
}
