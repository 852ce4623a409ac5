//! In-process fan-out of game events.

use async_trait::async_trait;
use tokio::sync::broadcast;
use warband_domain::{GameEvent, WorldId};

use crate::infrastructure::ports::GameEventPort;

const DEFAULT_CAPACITY: usize = 1024;

/// [`GameEventPort`] over a `tokio` broadcast channel.
///
/// Delivery is best effort: with no subscribers the event is dropped, and
/// slow subscribers lose the oldest events.
pub struct BroadcastGameEvents {
    sender: broadcast::Sender<GameEvent>,
}

impl BroadcastGameEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }

    fn publish(&self, event: GameEvent) {
        let world_id = event.world_id();
        if self.sender.send(event).is_err() {
            tracing::debug!(world_id = %world_id, "No game event subscribers, dropping event");
        }
    }
}

impl Default for BroadcastGameEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameEventPort for BroadcastGameEvents {
    async fn broadcast_turn_advance(&self, world_id: WorldId, year: i32, month: u8) {
        self.publish(GameEvent::TurnAdvanced {
            world_id,
            year,
            month,
        });
    }
}
