//! Per-world lifecycle registry.
//!
//! Written by the coordinator, read by anyone. Each world owns one atomic
//! cell created on first write; unknown worlds read as `IDLE`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU8, Ordering};

use dashmap::DashMap;
use tokio::sync::broadcast;
use warband_domain::{TurnLifecycleState, WorldId};

const STATUS_CHANNEL_CAPACITY: usize = 256;

/// A lifecycle transition, as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub world_id: WorldId,
    pub state: TurnLifecycleState,
}

/// Concurrent world id -> lifecycle state map.
pub struct TurnStatusService {
    states: DashMap<WorldId, AtomicU8>,
    changes: broadcast::Sender<StatusChange>,
}

impl TurnStatusService {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            states: DashMap::new(),
            changes,
        }
    }

    /// Current state of a world; `IDLE` if it was never updated.
    pub fn get_status(&self, world_id: WorldId) -> TurnLifecycleState {
        self.states
            .get(&world_id)
            .and_then(|cell| TurnLifecycleState::from_u8(cell.load(Ordering::Acquire)))
            .unwrap_or_default()
    }

    pub fn update_status(&self, world_id: WorldId, state: TurnLifecycleState) {
        if let Some(cell) = self.states.get(&world_id) {
            cell.store(state.as_u8(), Ordering::Release);
        } else {
            self.states
                .entry(world_id)
                .or_insert_with(|| AtomicU8::new(0))
                .store(state.as_u8(), Ordering::Release);
        }

        tracing::debug!(world_id = %world_id, state = %state, "Turn lifecycle transition");
        // No receivers is fine; slow receivers lag and lose old changes.
        let _ = self.changes.send(StatusChange { world_id, state });
    }

    /// Every world that has ever been updated, with its current state.
    pub fn snapshot(&self) -> BTreeMap<WorldId, TurnLifecycleState> {
        self.states
            .iter()
            .filter_map(|entry| {
                TurnLifecycleState::from_u8(entry.value().load(Ordering::Acquire))
                    .map(|state| (*entry.key(), state))
            })
            .collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.changes.subscribe()
    }
}

impl Default for TurnStatusService {
    fn default() -> Self {
        Self::new()
    }
}
