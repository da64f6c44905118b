// Path: crates/trifair-engine/src/engine.rs
//! The top-level composition root. One `Engine` instance owns the server
//! secret, the game configuration, the commitment pool, the reveal-once
//! registry, the session store, and the cache — no global singletons (§9).
//! Telemetry is the one exception: metrics go through the process-wide sink,
//! installed once at startup by calling `trifair_telemetry::prometheus::install`
//! (which in turn populates `trifair_telemetry::sinks` for every call site in
//! this crate to read back through `engine_metrics()`/`error_metrics()`); until
//! that's called, every sink read here falls back to a no-op.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use trifair_crypto::commitment::RoundRegistry;
use trifair_crypto::physics;
use trifair_telemetry::sinks::{engine_metrics, error_metrics, EngineMetricsSink};
use trifair_telemetry::time::SpinTimer;
use trifair_types::config::GameConfig;
use trifair_types::entropy::{ClientSeed, Commitment, Digest32, MappingMode, Proof};
use trifair_types::error::{EngineError, ErrorCode};
use trifair_types::grid::{ReelPositions, SymbolGrid};
use trifair_types::physics::SimulationParams;
use trifair_types::session::{
    BetPayload, EntropyPayload, Session, SessionEvent, SessionState, SpinResultPayload,
};

use crate::cache::{Cache, InMemoryCache};
use crate::mapper;
use crate::pool::{CommitmentPool, HouseSeedSource};
use crate::proof;
use crate::session::{self as session_fsm, InMemorySessionStore, SessionStore};
use crate::verify::{self, PublishedResult, VerifyReport};

/// What a completed spin produced, in whichever mode the caller asked for.
#[derive(Debug, Clone)]
pub enum SpinOutput {
    Grid(SymbolGrid),
    ReelPositions(ReelPositions),
}

/// A completed reveal: the immutable proof plus the published result it
/// attests to.
#[derive(Debug, Clone)]
pub struct SpinResult {
    pub proof: Proof,
    pub output: SpinOutput,
}

/// Composition root wiring C3 (reveal-once), C4 (mapping), C5 (proof),
/// C7 (pool), C8 (session store), and C9 (cache) around one server secret
/// and one [`GameConfig`].
pub struct Engine {
    server_secret: Vec<u8>,
    config: GameConfig,
    pool: CommitmentPool,
    registry: RoundRegistry,
    sessions: Arc<dyn SessionStore>,
    cache: Arc<dyn Cache>,
    /// In-process count of sessions not yet in a terminal state, mirrored
    /// into the `active_sessions` gauge on every transition (§10.3).
    active_sessions: AtomicI64,
}

impl Engine {
    pub fn new(server_secret: Vec<u8>, config: GameConfig, house_seed_source: HouseSeedSource) -> Self {
        let pool = CommitmentPool::new(config.pool_target_size, house_seed_source);
        Self {
            server_secret,
            config,
            pool,
            registry: RoundRegistry::new(),
            sessions: Arc::new(InMemorySessionStore::new()),
            cache: Arc::new(InMemoryCache::new()),
            active_sessions: AtomicI64::new(0),
        }
    }

    /// Swaps in an externally provided session store (e.g. backed by a real
    /// database instead of the in-memory default).
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = store;
        self
    }

    /// Swaps in an externally provided cache (e.g. Redis instead of the
    /// in-memory default).
    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn pool(&self) -> &CommitmentPool {
        &self.pool
    }

    /// Applies `event` to `session` via the session FSM (§4.8) and records
    /// whatever the transition implies for the session-lifecycle metrics:
    /// `sessions_expired_total` when it lands in `Expired`, and the
    /// `active_sessions` gauge whenever it enters a terminal state for the
    /// first time. The FSM itself (`session_fsm::apply_event`) stays free of
    /// telemetry so it remains a pure, easily-tested state transition.
    fn apply_event_and_record(
        &self,
        session: &mut Session,
        event: SessionEvent,
        now_ms: u64,
    ) -> Result<(), EngineError> {
        let before = session.state;
        session_fsm::apply_event(session, event, now_ms, self.config.max_history_size)?;
        if !before.is_terminal() && session.state.is_terminal() {
            if session.state == SessionState::Expired {
                engine_metrics().inc_sessions_expired();
            }
            let remaining = self.active_sessions.fetch_sub(1, Ordering::SeqCst) - 1;
            engine_metrics().set_active_sessions(remaining.max(0) as u64);
        }
        Ok(())
    }

    /// Creates a fresh session in `INIT` and immediately drives it to
    /// `AWAITING_BET` (§4.8: `START` is the only legal first event).
    pub async fn start_session(&self, id: String, user_id: String, game_id: String, now_ms: u64) -> Result<Session, EngineError> {
        let result = self.start_session_inner(id, user_id, game_id, now_ms).await;
        if let Err(e) = &result {
            error_metrics().inc_error("start_session", e.code());
        }
        result
    }

    async fn start_session_inner(&self, id: String, user_id: String, game_id: String, now_ms: u64) -> Result<Session, EngineError> {
        let mut session = Session::new(id, user_id, game_id, now_ms, self.config.session_ttl_ms);
        self.active_sessions.fetch_add(1, Ordering::SeqCst);
        self.apply_event_and_record(&mut session, SessionEvent::Start, now_ms)?;
        self.sessions.save(session.clone()).await?;
        engine_metrics().inc_sessions_created();
        engine_metrics().set_active_sessions(self.active_sessions.load(Ordering::SeqCst).max(0) as u64);
        Ok(session)
    }

    /// Convenience over [`Self::start_session`] for callers that have no
    /// natural session id of their own (e.g. a fresh anonymous player):
    /// mints one with `uuid`'s v4 generator rather than asking the caller
    /// to invent an id scheme.
    pub async fn start_new_session(&self, user_id: String, game_id: String, now_ms: u64) -> Result<Session, EngineError> {
        self.start_session(new_session_id(), user_id, game_id, now_ms).await
    }

    /// Places a bet, draws a commitment from the pool, caches it under the
    /// session id for the matching reveal, and advances the session to
    /// `ENTROPY_REQUESTED`. Returns the commitment to publish to the client
    /// before the spin.
    pub async fn place_bet(
        &self,
        session_id: &str,
        bet: BetPayload,
        now_ms: u64,
    ) -> Result<Commitment, EngineError> {
        let result = self.place_bet_inner(session_id, bet, now_ms).await;
        if let Err(e) = &result {
            error_metrics().inc_error("place_bet", e.code());
        }
        result
    }

    async fn place_bet_inner(
        &self,
        session_id: &str,
        bet: BetPayload,
        now_ms: u64,
    ) -> Result<Commitment, EngineError> {
        let mut session = self.load_session(session_id).await?;
        let commitment = self.pool.take(now_ms)?;
        engine_metrics().inc_commitments_issued();

        self.apply_event_and_record(&mut session, SessionEvent::PlaceBet(bet), now_ms)?;
        self.sessions.save(session.clone()).await?;

        let cache_key = commitment_cache_key(session_id);
        let serialized = serde_json::to_vec(&commitment).map_err(|e| EngineError::Internal(e.to_string()))?;
        self.cache
            .set(&cache_key, serialized, Some(std::time::Duration::from_millis(self.config.commitment_ttl_ms)))
            .await;

        Ok(commitment)
    }

    /// Reveals the round: mixes entropy (C3), runs the reveal-path physics
    /// digest (C1) for `thetaVector`, maps the result (C4), builds the proof
    /// (C5), evicts the cached commitment, and drives the session through
    /// `ENTROPY_RECEIVED` to `SPIN_COMPLETE`.
    pub async fn reveal(
        &self,
        session_id: &str,
        client_seed: ClientSeed,
        nonce: u64,
        mapping_mode: MappingMode,
        now_ms: u64,
    ) -> Result<SpinResult, EngineError> {
        let result = self.reveal_inner(session_id, client_seed, nonce, mapping_mode, now_ms).await;
        if let Err(e) = &result {
            error_metrics().inc_error("reveal", e.code());
        }
        result
    }

    async fn reveal_inner(
        &self,
        session_id: &str,
        client_seed: ClientSeed,
        nonce: u64,
        mapping_mode: MappingMode,
        now_ms: u64,
    ) -> Result<SpinResult, EngineError> {
        let _timer = SpinTimer::new(engine_metrics());

        let mut session = self.load_session(session_id).await?;
        let cache_key = commitment_cache_key(session_id);
        let cached = self
            .cache
            .get(&cache_key)
            .await
            .ok_or_else(|| EngineError::NotFound(format!("no pending commitment for session {session_id}")))?;
        let commitment: Commitment =
            serde_json::from_slice(&cached).map_err(|e| EngineError::Internal(e.to_string()))?;

        let (commitment, combined_entropy) = match self.registry.create_round(
            commitment.house_seed,
            &client_seed,
            nonce,
            now_ms,
        ) {
            Ok(round) => round,
            Err(error @ EngineError::AlreadyRevealed(_)) => {
                engine_metrics().inc_already_revealed_rejections();
                return Err(error);
            }
            Err(error) => return Err(error),
        };
        engine_metrics().inc_rounds_revealed();

        let entropy_digest = self.reveal_entropy_digest(&commitment.house_seed, &client_seed, nonce)?;

        self.apply_event_and_record(
            &mut session,
            SessionEvent::EntropyReceived(EntropyPayload { digest: entropy_digest }),
            now_ms,
        )?;

        let proof = proof::build_proof(
            &commitment,
            &client_seed,
            nonce,
            &entropy_digest,
            &combined_entropy,
            &self.server_secret,
            mapping_mode,
            now_ms,
        );

        let output = match mapping_mode {
            MappingMode::Grid => SpinOutput::Grid(mapper::map_grid(&combined_entropy, &self.config)?),
            MappingMode::ReelPosition => SpinOutput::ReelPositions(mapper::map_reel_positions(
                &combined_entropy,
                &client_seed,
                nonce,
                self.config.reel_count,
                self.config.symbols_per_reel,
            )?),
        };

        self.apply_event_and_record(
            &mut session,
            SessionEvent::SpinComplete(SpinResultPayload { proof: proof.clone() }),
            now_ms,
        )?;
        self.sessions.save(session).await?;
        self.cache.del(&cache_key).await;

        Ok(SpinResult { proof, output })
    }

    /// The reveal-path physics digest (§4.1 `duration=3.0` defaults): initial
    /// conditions are expanded deterministically from this round's seed
    /// material, so replaying it needs only the published `houseSeed`,
    /// `clientSeed`, and `nonce` — never the live pool state.
    fn reveal_entropy_digest(
        &self,
        house_seed: &Digest32,
        client_seed: &ClientSeed,
        nonce: u64,
    ) -> Result<Digest32, EngineError> {
        let derived = trifair_crypto::hash::derive_seed(
            house_seed.as_bytes(),
            client_seed.mixing_bytes(),
            nonce,
            self.config.hash_algorithm,
        )?;
        let seed: [u8; 32] = derived
            .get(..32)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| EngineError::Internal("derived seed shorter than 32 bytes".to_string()))?;

        let configuration = physics::configuration_from_seed(&seed)?;
        let simulation_id = format!("{}:{}", house_seed.to_hex(), nonce);
        let simulation_id_tag = simulation_id.get(..16).unwrap_or(&simulation_id);
        let _timer = trifair_telemetry::time::IntegratorTimer::new(engine_metrics());
        let state = physics::simulate(&configuration, SimulationParams::REVEAL, simulation_id_tag)?;
        Ok(Digest32::new(physics::digest(&state)?))
    }

    async fn load_session(&self, session_id: &str) -> Result<Session, EngineError> {
        self.sessions
            .load(session_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("session {session_id} not found")))
    }

    /// Delegates to the offline verifier (C10) with this engine's own
    /// configuration, so a caller holding an `Engine` never has to thread
    /// the config through separately.
    pub fn verify(
        &self,
        proof: &Proof,
        known_commit_hash: Option<&Digest32>,
        check_signature: bool,
        published: &PublishedResult,
    ) -> VerifyReport {
        let secret = if check_signature { Some(self.server_secret.as_slice()) } else { None };
        let report = verify::verify(proof, known_commit_hash, secret, &self.config, published);
        engine_metrics().inc_verify_requests(if report.valid { "valid" } else { "invalid" });
        report
    }
}

fn commitment_cache_key(session_id: &str) -> String {
    format!("trifair:pending-commitment:{session_id}")
}

/// A fresh, globally-unique session id.
fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trifair_test_utils::fixtures::sample_game_config;

    fn test_engine() -> Engine {
        Engine::new(b"server-secret".to_vec(), sample_game_config(), HouseSeedSource::CryptoRandom)
    }

    #[tokio::test]
    async fn full_round_trip_reaches_complete_and_verifies() {
        let engine = test_engine();
        let session = engine
            .start_session("s1".to_string(), "u1".to_string(), "slots".to_string(), 0)
            .await
            .expect("start session");
        assert_eq!(session.state, trifair_types::session::SessionState::AwaitingBet);

        let bet = BetPayload {
            amount: 100,
            currency: "USD".to_string(),
            client_seed: ClientSeed::Provided(b"alice".to_vec()),
            nonce: 1,
        };
        engine.place_bet("s1", bet, 1).await.expect("place bet");

        let result = engine
            .reveal("s1", ClientSeed::Provided(b"alice".to_vec()), 1, MappingMode::Grid, 2)
            .await
            .expect("reveal");

        let grid = match result.output {
            SpinOutput::Grid(grid) => grid,
            SpinOutput::ReelPositions(_) => panic!("expected grid output"),
        };

        let report = engine.verify(&result.proof, Some(&result.proof.commit_hash), true, &PublishedResult::Grid(grid));
        assert!(report.valid);

        let loaded = engine.load_session("s1").await.expect("session exists");
        assert_eq!(loaded.state, trifair_types::session::SessionState::Complete);
    }

    #[tokio::test]
    async fn start_new_session_mints_a_distinct_id_per_call() {
        let engine = test_engine();
        let first = engine
            .start_new_session("u1".to_string(), "slots".to_string(), 0)
            .await
            .expect("start session");
        let second = engine
            .start_new_session("u1".to_string(), "slots".to_string(), 0)
            .await
            .expect("start session");
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn reveal_without_a_pending_bet_is_not_found() {
        let engine = test_engine();
        engine
            .start_session("s2".to_string(), "u1".to_string(), "slots".to_string(), 0)
            .await
            .expect("start session");

        let result = engine
            .reveal("s2", ClientSeed::TestMode, 1, MappingMode::Grid, 1)
            .await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn second_reveal_of_the_same_round_is_rejected() {
        let engine = test_engine();
        engine
            .start_session("s3".to_string(), "u1".to_string(), "slots".to_string(), 0)
            .await
            .expect("start session");
        let bet = BetPayload {
            amount: 1,
            currency: "USD".to_string(),
            client_seed: ClientSeed::TestMode,
            nonce: 7,
        };
        engine.place_bet("s3", bet, 1).await.expect("place bet");
        engine
            .reveal("s3", ClientSeed::TestMode, 7, MappingMode::Grid, 2)
            .await
            .expect("first reveal succeeds");

        // Re-seed the cache to simulate a retried reveal referencing the same
        // already-consumed house seed/nonce pair.
        let second = engine
            .reveal("s3", ClientSeed::TestMode, 7, MappingMode::Grid, 3)
            .await;
        assert!(matches!(second, Err(EngineError::NotFound(_))));
    }
}
