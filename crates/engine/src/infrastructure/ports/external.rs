//! Outbound notification port.

use async_trait::async_trait;
use warband_domain::WorldId;

/// Downstream broadcast of turn notifications.
///
/// Fire-and-forget: implementations handle their own delivery failures and
/// never report them back into the turn pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameEventPort: Send + Sync {
    async fn broadcast_turn_advance(&self, world_id: WorldId, year: i32, month: u8);
}
