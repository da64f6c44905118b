// Path: crates/trifair-engine/src/pool.rs
//! C7: a bounded, pre-generated queue of ready-to-use commitments.
//!
//! Exists purely to keep the multi-millisecond physics integrator off the
//! reveal path: `take()` always returns immediately, minting synchronously
//! only on the rare occasion the queue is empty.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::RngCore;
use trifair_types::entropy::{Commitment, Digest32};
use trifair_types::error::CryptoError;
use trifair_types::physics::{Configuration, SimulationParams};

use trifair_crypto::{commitment as commit_core, physics};
use trifair_telemetry::sinks::EngineMetricsSink;

/// How a fresh `houseSeed` is minted when the pool needs a new one (§9 open
/// question: the spec permits either and leaves the choice to policy).
#[derive(Debug, Clone, Copy)]
pub enum HouseSeedSource {
    /// Draw 32 bytes from a cryptographic RNG, cheaply.
    CryptoRandom,
    /// Run the three-body integrator from a randomly seeded configuration
    /// and take its digest. More expensive, used when the house wants the
    /// physics narrative to be literally true of every seed, not just the
    /// reveal-path mixing.
    Physics(Configuration),
}

fn mint_house_seed(source: &HouseSeedSource) -> Result<Digest32, CryptoError> {
    match source {
        HouseSeedSource::CryptoRandom => {
            let mut bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut bytes);
            Ok(Digest32::new(bytes))
        }
        HouseSeedSource::Physics(configuration) => {
            let simulation_id = {
                let mut tag = [0u8; 8];
                rand::rngs::OsRng.fill_bytes(&mut tag);
                hex::encode(tag)
            };
            let state = physics::simulate(configuration, SimulationParams::HOUSE_SEED, &simulation_id)?;
            let digest = physics::digest(&state)?;
            Ok(Digest32::new(digest))
        }
    }
}

struct Inner {
    queue: VecDeque<Commitment>,
    target_size: usize,
    source: HouseSeedSource,
}

/// Shared, cloneable handle to the commitment pool. Any worker may call
/// [`CommitmentPool::take`]; [`CommitmentPool::refill_if_needed`] is meant
/// to run from exactly one background task, but is safe to call from more
/// than one since it only ever adds commitments up to `target_size`.
#[derive(Clone)]
pub struct CommitmentPool {
    inner: Arc<Mutex<Inner>>,
}

impl CommitmentPool {
    pub fn new(target_size: usize, source: HouseSeedSource) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                queue: VecDeque::with_capacity(target_size),
                target_size,
                source,
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pops one ready commitment, minting synchronously on the caller's path
    /// if the queue happens to be empty (§4.7).
    pub fn take(&self, now_ms: u64) -> Result<Commitment, CryptoError> {
        let popped = self.inner.lock().queue.pop_front();
        match popped {
            Some(commitment) => Ok(commitment),
            None => {
                let source = {
                    let guard = self.inner.lock();
                    clone_source(&guard.source)
                };
                let house_seed = mint_house_seed(&source)?;
                Ok(commit_core::commit(house_seed, now_ms))
            }
        }
    }

    /// Mints commitments until the queue reaches `target_size`. Intended to
    /// be called whenever the queue drops below half its target (§4.7); the
    /// caller decides the trigger, this just does the filling.
    pub fn refill_if_needed(&self, now_ms: u64, sink: &dyn EngineMetricsSink) -> Result<usize, CryptoError> {
        let (deficit, source) = {
            let guard = self.inner.lock();
            let deficit = guard.target_size.saturating_sub(guard.queue.len());
            (deficit, clone_source(&guard.source))
        };
        if deficit == 0 {
            return Ok(0);
        }

        let mut minted = Vec::with_capacity(deficit);
        for _ in 0..deficit {
            let house_seed = mint_house_seed(&source)?;
            minted.push(commit_core::commit(house_seed, now_ms));
        }

        {
            let mut guard = self.inner.lock();
            guard.queue.extend(minted);
            sink.set_pool_size(guard.queue.len() as u64);
        }
        sink.inc_pool_refills();
        for _ in 0..deficit {
            sink.inc_commitments_issued();
        }
        Ok(deficit)
    }

    /// Runs [`Self::refill_if_needed`] in a loop whenever the queue drops
    /// below half of `target_size`, until `shutdown` resolves. Meant to be
    /// spawned once as the pool's single background refill task (§5
    /// Concurrency: "any worker may take; exactly one background task
    /// refills").
    pub async fn run_refill_loop(
        self,
        poll_interval: std::time::Duration,
        sink: Arc<dyn EngineMetricsSink>,
        now_ms: impl Fn() -> u64 + Send + 'static,
        mut shutdown: tokio::sync::oneshot::Receiver<()>,
    ) {
        loop {
            let half_target = {
                let guard = self.inner.lock();
                guard.target_size / 2
            };
            if self.len() <= half_target {
                if let Err(error) = self.refill_if_needed(now_ms(), sink.as_ref()) {
                    tracing::warn!(%error, "commitment pool refill failed");
                }
            }

            tokio::select! {
                _ = &mut shutdown => return,
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
    }
}

fn clone_source(source: &HouseSeedSource) -> HouseSeedSource {
    match source {
        HouseSeedSource::CryptoRandom => HouseSeedSource::CryptoRandom,
        HouseSeedSource::Physics(configuration) => HouseSeedSource::Physics(configuration.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trifair_telemetry::sinks::NopSink;

    #[test]
    fn take_mints_synchronously_when_empty() {
        let pool = CommitmentPool::new(4, HouseSeedSource::CryptoRandom);
        assert_eq!(pool.len(), 0);
        let commitment = pool.take(0).expect("mint succeeds");
        assert!(trifair_crypto::commitment::verify_commit(
            &commitment.house_seed,
            &commitment.commit_hash
        ));
    }

    #[test]
    fn refill_tops_up_to_target_size() {
        let pool = CommitmentPool::new(4, HouseSeedSource::CryptoRandom);
        let sink = NopSink;
        let minted = pool.refill_if_needed(0, &sink).expect("mint succeeds");
        assert_eq!(minted, 4);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn refill_is_a_no_op_once_full() {
        let pool = CommitmentPool::new(2, HouseSeedSource::CryptoRandom);
        let sink = NopSink;
        pool.refill_if_needed(0, &sink).expect("mint succeeds");
        let second = pool.refill_if_needed(0, &sink).expect("mint succeeds");
        assert_eq!(second, 0);
    }

    #[test]
    fn take_drains_the_prefilled_queue_before_minting_fresh() {
        let pool = CommitmentPool::new(2, HouseSeedSource::CryptoRandom);
        let sink = NopSink;
        pool.refill_if_needed(0, &sink).expect("mint succeeds");
        assert_eq!(pool.len(), 2);
        pool.take(0).expect("pop from queue");
        assert_eq!(pool.len(), 1);
    }
}
