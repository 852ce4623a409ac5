//! Periodic driver that hands eligible worlds to the coordinator.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use warband_domain::{World, WorldId};

use super::coordinator::TurnCoordinator;
use super::error::TurnError;
use crate::infrastructure::ports::WorldRepo;

/// Scheduler state. A tick only starts from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Idle,
    Running,
    Paused,
    Stopping,
}

/// What one tick did with each listed world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub processed: Vec<WorldId>,
    pub skipped_other_build: usize,
    pub skipped_inactive: usize,
    pub skipped_realtime: usize,
}

impl TickSummary {
    pub fn considered(&self) -> usize {
        self.processed.len()
            + self.skipped_other_build
            + self.skipped_inactive
            + self.skipped_realtime
    }
}

pub struct TurnDaemon {
    worlds: Arc<dyn WorldRepo>,
    coordinator: Arc<TurnCoordinator>,
    commit_sha: String,
    state: watch::Sender<DaemonState>,
}

impl TurnDaemon {
    pub fn new(
        worlds: Arc<dyn WorldRepo>,
        coordinator: Arc<TurnCoordinator>,
        commit_sha: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(DaemonState::Idle);
        Self {
            worlds,
            coordinator,
            commit_sha: commit_sha.into(),
            state,
        }
    }

    pub fn state(&self) -> DaemonState {
        *self.state.borrow()
    }

    /// Process every eligible world once.
    ///
    /// Returns `Ok(None)` without doing anything unless the daemon is idle.
    /// Worlds are processed one after another; a failing world does not
    /// affect the others.
    pub async fn tick(&self) -> Result<Option<TickSummary>, TurnError> {
        if !self.transition(DaemonState::Idle, DaemonState::Running) {
            tracing::debug!(state = ?self.state(), "Daemon busy, skipping tick");
            return Ok(None);
        }

        let outcome = self.run_tick().await;
        // A pause or stop requested mid-tick stays in effect.
        self.transition(DaemonState::Running, DaemonState::Idle);

        let summary = outcome?;
        tracing::info!(
            processed = summary.processed.len(),
            skipped_other_build = summary.skipped_other_build,
            skipped_inactive = summary.skipped_inactive,
            skipped_realtime = summary.skipped_realtime,
            "Turn daemon tick finished"
        );
        Ok(Some(summary))
    }

    async fn run_tick(&self) -> Result<TickSummary, TurnError> {
        let mut summary = TickSummary::default();
        for world in self.worlds.list().await? {
            if !self.is_current_build(&world) {
                summary.skipped_other_build += 1;
                continue;
            }
            if !world.is_gateway_active() {
                summary.skipped_inactive += 1;
                continue;
            }
            if world.is_realtime() {
                // Realtime worlds are driven by command completion, not ticks.
                summary.skipped_realtime += 1;
                continue;
            }
            self.coordinator.process_world(&world).await;
            summary.processed.push(world.id());
        }
        Ok(summary)
    }

    /// Untagged worlds run on every build.
    fn is_current_build(&self, world: &World) -> bool {
        world.commit_sha().map_or(true, |sha| sha == self.commit_sha)
    }

    pub fn pause(&self) {
        self.state.send_if_modified(|state| match state {
            DaemonState::Idle | DaemonState::Running => {
                *state = DaemonState::Paused;
                true
            }
            _ => false,
        });
    }

    pub fn resume(&self) {
        self.transition(DaemonState::Paused, DaemonState::Idle);
    }

    /// Ask `run` to exit after the current tick. Final.
    pub fn stop(&self) {
        self.state.send_replace(DaemonState::Stopping);
    }

    /// Run one tick now if the daemon is idle.
    pub async fn manual_run(&self) -> Result<Option<TickSummary>, TurnError> {
        self.tick().await
    }

    /// Tick every `interval` until [`stop`](Self::stop) is called.
    pub async fn run(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut state_rx = self.state.subscribe();

        tracing::info!(interval_ms = interval.as_millis() as u64, "Turn daemon started");
        while self.state() != DaemonState::Stopping {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        tracing::error!(error = %e, "Turn daemon tick failed");
                    }
                }
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::info!("Turn daemon stopped");
    }

    /// Compare-and-set on the daemon state.
    fn transition(&self, from: DaemonState, to: DaemonState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        })
    }
}
