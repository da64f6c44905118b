// Path: crates/trifair-engine/src/session.rs
//! C8: the session state machine and its store interface.

use async_trait::async_trait;
use dashmap::DashMap;
use trifair_types::error::EngineError;
use trifair_types::session::{HistoryEntry, Session, SessionEvent, SessionState};

/// The authoritative transition table (§4.8). Returns the destination state,
/// or `None` if `event` is not legal from `from`.
fn destination(from: SessionState, event: &SessionEvent) -> Option<SessionState> {
    use SessionEvent as E;
    use SessionState as S;

    if from.is_terminal() {
        return None;
    }

    match (from, event) {
        (S::Init, E::Start) => Some(S::AwaitingBet),
        (S::AwaitingBet, E::PlaceBet(_)) => Some(S::EntropyRequested),
        (S::EntropyRequested, E::EntropyReceived(_)) => Some(S::Spinning),
        (S::Spinning, E::SpinComplete(_)) => Some(S::Complete),
        (S::Complete, E::Reset) => Some(S::AwaitingBet),
        (S::Error, E::Reset) => Some(S::Init),
        (S::Error, E::Cancel) => Some(S::Cancelled),
        (_, E::Error(_)) => Some(S::Error),
        (_, E::Cancel) => Some(S::Cancelled),
        (_, E::Expire) => Some(S::Expired),
        _ => None,
    }
}

/// Copies the payload fields an event carries into `session.data`, per the
/// §4.8 event-to-field table. Anything without a dedicated mapping lands in
/// the `custom` bucket under the event's name.
fn apply_payload(session: &mut Session, event: &SessionEvent) {
    match event {
        SessionEvent::PlaceBet(bet) => {
            session.data.bet = Some(bet.clone());
        }
        SessionEvent::EntropyReceived(entropy) => {
            session.data.last_entropy_digest = Some(entropy.digest);
        }
        SessionEvent::SpinComplete(result) => {
            session.data.last_result = Some(result.proof.clone());
        }
        SessionEvent::Custom { name, payload } => {
            session.data.custom.insert(name.clone(), payload.clone());
        }
        SessionEvent::Start | SessionEvent::Reset | SessionEvent::Cancel | SessionEvent::Expire => {}
        SessionEvent::Error(reason) => {
            session.data.custom.insert(
                "error_reason".to_string(),
                serde_json::Value::String(reason.clone()),
            );
        }
    }
}

fn event_payload_json(event: &SessionEvent) -> Option<serde_json::Value> {
    serde_json::to_value(event).ok()
}

/// Applies `event` to `session` in place (§4.8). Before evaluating `event`,
/// if `now_ms > session.expires_at` and `event` is not itself `Expire`, an
/// `Expire` event is synthesized and processed instead.
pub fn apply_event(
    session: &mut Session,
    event: SessionEvent,
    now_ms: u64,
    max_history_size: usize,
) -> Result<(), EngineError> {
    let event = if now_ms > session.expires_at && !matches!(event, SessionEvent::Expire) {
        SessionEvent::Expire
    } else {
        event
    };

    let from = session.state;
    let to = destination(from, &event).ok_or_else(|| EngineError::InvalidTransition {
        event: event.name().to_string(),
        from,
    })?;

    apply_payload(session, &event);

    if matches!(event, SessionEvent::Error(_)) {
        if let SessionEvent::Error(reason) = &event {
            session.error = Some(reason.clone());
        }
    } else if matches!(to, SessionState::Init | SessionState::AwaitingBet) {
        session.error = None;
    }

    session.history.push(HistoryEntry {
        from,
        to,
        event: event.name().to_string(),
        at: now_ms,
        payload: event_payload_json(&event),
    });
    if session.history.len() > max_history_size {
        let overflow = session.history.len() - max_history_size;
        session.history.drain(0..overflow);
    }

    session.state = to;
    session.updated_at = now_ms;
    Ok(())
}

/// Session persistence interface (§6). Reads after a successful write to the
/// same `id` must return the written value.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: Session) -> Result<(), EngineError>;
    async fn load(&self, id: &str) -> Result<Option<Session>, EngineError>;
    async fn delete(&self, id: &str) -> Result<(), EngineError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Session>, EngineError>;
    async fn list_by_state(&self, state: SessionState) -> Result<Vec<Session>, EngineError>;
}

/// Default in-memory implementation, used directly in tests and as the
/// fallback when no external store is wired up.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, session: Session) -> Result<(), EngineError> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Session>, EngineError> {
        Ok(self.sessions.get(id).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: &str) -> Result<(), EngineError> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Session>, EngineError> {
        Ok(self
            .sessions
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn list_by_state(&self, state: SessionState) -> Result<Vec<Session>, EngineError> {
        Ok(self
            .sessions
            .iter()
            .filter(|entry| entry.value().state == state)
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trifair_types::entropy::ClientSeed;
    use trifair_types::session::BetPayload;

    fn new_session() -> Session {
        Session::new("s1".to_string(), "u1".to_string(), "g1".to_string(), 0, 900_000)
    }

    #[test]
    fn happy_path_reaches_complete_with_history_length_four() {
        let mut session = new_session();
        apply_event(&mut session, SessionEvent::Start, 1, 64).expect("init->awaiting_bet");
        apply_event(
            &mut session,
            SessionEvent::PlaceBet(BetPayload {
                amount: 100,
                currency: "USD".to_string(),
                client_seed: ClientSeed::Provided(b"alice".to_vec()),
                nonce: 1,
            }),
            2,
            64,
        )
        .expect("awaiting_bet->entropy_requested");
        apply_event(
            &mut session,
            SessionEvent::EntropyReceived(trifair_types::session::EntropyPayload {
                digest: trifair_types::entropy::Digest32::new([0u8; 32]),
            }),
            3,
            64,
        )
        .expect("entropy_requested->spinning");

        let proof = crate::proof::build_proof(
            &trifair_types::entropy::Commitment {
                commit_hash: trifair_types::entropy::Digest32::new([1u8; 32]),
                house_seed: trifair_types::entropy::Digest32::new([2u8; 32]),
                created_at: 0,
            },
            &ClientSeed::Provided(b"alice".to_vec()),
            1,
            &trifair_types::entropy::Digest32::new([3u8; 32]),
            &trifair_types::entropy::Digest32::new([4u8; 32]),
            b"secret",
            trifair_types::entropy::MappingMode::Grid,
            4,
        );
        apply_event(
            &mut session,
            SessionEvent::SpinComplete(trifair_types::session::SpinResultPayload { proof }),
            4,
            64,
        )
        .expect("spinning->complete");

        assert_eq!(session.state, SessionState::Complete);
        assert_eq!(session.history.len(), 4);
    }

    #[test]
    fn illegal_transition_leaves_state_and_history_untouched() {
        let mut session = new_session();
        let before_history_len = session.history.len();
        let result = apply_event(
            &mut session,
            SessionEvent::SpinComplete(trifair_types::session::SpinResultPayload {
                proof: crate::proof::build_proof(
                    &trifair_types::entropy::Commitment {
                        commit_hash: trifair_types::entropy::Digest32::new([1u8; 32]),
                        house_seed: trifair_types::entropy::Digest32::new([2u8; 32]),
                        created_at: 0,
                    },
                    &ClientSeed::TestMode,
                    1,
                    &trifair_types::entropy::Digest32::new([3u8; 32]),
                    &trifair_types::entropy::Digest32::new([4u8; 32]),
                    b"secret",
                    trifair_types::entropy::MappingMode::Grid,
                    0,
                ),
            }),
            1,
            64,
        );
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
        assert_eq!(session.state, SessionState::Init);
        assert_eq!(session.history.len(), before_history_len);
    }

    #[test]
    fn cancel_is_legal_from_any_non_terminal_state() {
        let mut session = new_session();
        apply_event(&mut session, SessionEvent::Cancel, 1, 64).expect("init->cancelled");
        assert_eq!(session.state, SessionState::Cancelled);
        assert!(apply_event(&mut session, SessionEvent::Start, 2, 64).is_err());
    }

    #[test]
    fn access_past_ttl_synthesizes_expire() {
        let mut session = Session::new("s2".to_string(), "u1".to_string(), "g1".to_string(), 0, 10);
        let result = apply_event(&mut session, SessionEvent::Start, 1_000, 64);
        assert!(result.is_ok());
        assert_eq!(session.state, SessionState::Expired);
    }

    #[test]
    fn history_is_bounded_by_max_history_size() {
        let mut session = new_session();
        apply_event(&mut session, SessionEvent::Start, 1, 2).expect("init->awaiting_bet");
        apply_event(&mut session, SessionEvent::Cancel, 2, 2).expect("awaiting_bet->cancelled");
        assert!(session.history.len() <= 2);
    }

    #[tokio::test]
    async fn in_memory_store_round_trips_by_id() {
        let store = InMemorySessionStore::new();
        let session = new_session();
        store.save(session.clone()).await.expect("save");
        let loaded = store.load("s1").await.expect("load").expect("present");
        assert_eq!(loaded.id, session.id);
    }

    #[tokio::test]
    async fn in_memory_store_lists_by_state() {
        let store = InMemorySessionStore::new();
        store.save(new_session()).await.expect("save");
        let found = store
            .list_by_state(SessionState::Init)
            .await
            .expect("list");
        assert_eq!(found.len(), 1);
    }
}
