//! Repository port traits for database access.

use async_trait::async_trait;
use warband_domain::{World, WorldId};

use super::error::RepoError;
use super::types::{PersistBatch, WorldRecords};

// =============================================================================
// Database Ports
// =============================================================================

/// The world row itself, read by the scheduler and loader.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorldRepo: Send + Sync {
    async fn get(&self, id: WorldId) -> Result<Option<World>, RepoError>;
    async fn save(&self, world: &World) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<World>, RepoError>;
}

/// Everything a world owns besides its own row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorldStateRepo: Send + Sync {
    /// Read every row scoped to `world_id` as of the call.
    async fn load(&self, world_id: WorldId) -> Result<WorldRecords, RepoError>;

    /// Upsert `world` and apply `batch` to its rows, all or nothing.
    ///
    /// The world row travels with the batch so a pass never lands half
    /// stored: either the calendar advances together with the consumed
    /// commands, or neither does.
    async fn commit(&self, world: &World, batch: &PersistBatch) -> Result<(), RepoError>;
}
