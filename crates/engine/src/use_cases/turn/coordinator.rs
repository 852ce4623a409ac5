//! One turn pass for one world, with its lifecycle state machine.
//!
//! ```text
//! IDLE -> LOADING -> PROCESSING -> PERSISTING -> PUBLISHING -> IDLE
//!            \            \             \             \
//!             +------------+-------------+-------------+--> FAILED -> IDLE
//! ```
//!
//! The coordinator is the error boundary of the pipeline: `process_world`
//! never returns an error. Failures are logged and reflected in the status
//! registry, then the world returns to `IDLE` and is immediately eligible
//! for the next pass.

use std::sync::Arc;

use warband_domain::{TurnLifecycleState, TurnResult, World, WorldId};

use super::dirty_tracker::DirtyTracker;
use super::error::TurnError;
use super::loader::WorldStateLoader;
use super::persister::WorldStatePersister;
use super::processor::InMemoryTurnProcessor;
use super::status::TurnStatusService;
use crate::infrastructure::ports::GameEventPort;

pub struct TurnCoordinator {
    loader: WorldStateLoader,
    processor: InMemoryTurnProcessor,
    persister: WorldStatePersister,
    events: Arc<dyn GameEventPort>,
    status: Arc<TurnStatusService>,
}

impl TurnCoordinator {
    pub fn new(
        loader: WorldStateLoader,
        processor: InMemoryTurnProcessor,
        persister: WorldStatePersister,
        events: Arc<dyn GameEventPort>,
        status: Arc<TurnStatusService>,
    ) -> Self {
        Self {
            loader,
            processor,
            persister,
            events,
            status,
        }
    }

    pub fn status(&self) -> &Arc<TurnStatusService> {
        &self.status
    }

    /// Run every due turn of `world`, persist and publish the outcome.
    ///
    /// Always leaves the world in `IDLE`, whether or not the pass succeeded.
    /// Callers must not run two passes for the same world concurrently.
    pub async fn process_world(&self, world: &World) {
        let world_id = world.id();
        match self.run_pass(world).await {
            Ok(result) => {
                tracing::debug!(
                    world_id = %world_id,
                    advanced_turns = result.advanced_turns,
                    events = result.events.len(),
                    "Turn pass completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    world_id = %world_id,
                    error = %e,
                    "Turn processing failed"
                );
                self.status.update_status(world_id, TurnLifecycleState::Failed);
            }
        }
        self.status.update_status(world_id, TurnLifecycleState::Idle);
    }

    async fn run_pass(&self, world: &World) -> Result<TurnResult, TurnError> {
        let world_id = world.id();

        self.status.update_status(world_id, TurnLifecycleState::Loading);
        let mut state = self.loader.load_world_state(world_id).await?;

        self.status.update_status(world_id, TurnLifecycleState::Processing);
        let mut world = world.clone();
        let mut tracker = DirtyTracker::new();
        let result = self
            .processor
            .process(&mut state, &mut tracker, &mut world)?;

        self.status.update_status(world_id, TurnLifecycleState::Persisting);
        self.persister.persist(&state, &mut tracker, &world).await?;

        self.status.update_status(world_id, TurnLifecycleState::Publishing);
        self.publish(world_id, &result).await;

        Ok(result)
    }

    /// Forward each `TURN_ADVANCED` event; other event types are ignored.
    async fn publish(&self, world_id: WorldId, result: &TurnResult) {
        for event in result.events.iter().filter(|e| e.is_turn_advanced()) {
            match event.calendar() {
                Some((year, month)) => {
                    self.events
                        .broadcast_turn_advance(world_id, year, month)
                        .await;
                }
                None => {
                    tracing::warn!(
                        world_id = %world_id,
                        payload = ?event.payload,
                        "Skipping TURN_ADVANCED event with malformed payload"
                    );
                }
            }
        }
    }
}
