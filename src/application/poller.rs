use super::engine::PayrollEngine;
use crate::error::PayrollError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{error, info, warn};

/// Counters reported when a poller stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollerStats {
    pub ticks: u64,
    pub settled: u64,
    pub deferred: u64,
    pub failed: u64,
}

/// Timer-style automation trigger.
///
/// On every tick it keeps calling `run_once` until nothing is due or the
/// per-tick budget is spent, then sleeps until the next tick.
pub struct Poller {
    engine: Arc<PayrollEngine>,
    period: Duration,
    max_per_tick: usize,
}

impl Poller {
    pub fn new(engine: Arc<PayrollEngine>, period: Duration, max_per_tick: usize) -> Self {
        Self {
            engine,
            period,
            max_per_tick,
        }
    }

    /// Runs until `shutdown` flips to `true` or its sender is dropped.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<PollerStats> {
        tokio::spawn(async move {
            let mut stats = PollerStats::default();
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        stats.ticks += 1;
                        self.drain(&mut stats).await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!(?stats, "poller stopped");
            stats
        })
    }

    async fn drain(&self, stats: &mut PollerStats) {
        for _ in 0..self.max_per_tick {
            match self.engine.run_once().await {
                Ok(None) => break,
                Ok(Some(outcome)) if outcome.is_settled() => stats.settled += 1,
                Ok(Some(_)) => stats.deferred += 1,
                Err(err @ (PayrollError::InvariantViolation(_) | PayrollError::BridgeSubmit(_))) => {
                    error!(error = %err, "poller halted this tick");
                    stats.failed += 1;
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "dispatch rejected");
                    stats.failed += 1;
                }
            }
        }
    }
}
