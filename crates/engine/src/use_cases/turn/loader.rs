//! Loads a world's working set in one go.

use std::sync::Arc;

use warband_domain::WorldId;

use super::error::TurnError;
use super::state::InMemoryWorldState;
use crate::infrastructure::ports::{WorldRepo, WorldStateRepo};

/// Produces a self-contained snapshot so processing never touches storage.
pub struct WorldStateLoader {
    worlds: Arc<dyn WorldRepo>,
    world_state: Arc<dyn WorldStateRepo>,
}

impl WorldStateLoader {
    pub fn new(worlds: Arc<dyn WorldRepo>, world_state: Arc<dyn WorldStateRepo>) -> Self {
        Self {
            worlds,
            world_state,
        }
    }

    /// Read every record of `world_id` as of now.
    ///
    /// Fails with [`TurnError::WorldNotFound`] when the world row is absent.
    pub async fn load_world_state(
        &self,
        world_id: WorldId,
    ) -> Result<InMemoryWorldState, TurnError> {
        if self.worlds.get(world_id).await?.is_none() {
            return Err(TurnError::WorldNotFound(world_id));
        }

        let records = self.world_state.load(world_id).await?;
        let state = InMemoryWorldState::from_records(world_id, records);
        tracing::debug!(
            world_id = %world_id,
            generals = state.generals.len(),
            nations = state.nations.len(),
            cities = state.cities.len(),
            "Loaded world state"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockWorldRepo, MockWorldStateRepo, RepoError, WorldRecords};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::*;
    use warband_domain::{General, GeneralId, World};

    fn world(id: i64) -> World {
        World::new(
            WorldId::new(id),
            184,
            1,
            600,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn missing_world_is_not_found() {
        let mut worlds = MockWorldRepo::new();
        worlds
            .expect_get()
            .with(eq(WorldId::new(42)))
            .returning(|_| Ok(None));
        let mut state_repo = MockWorldStateRepo::new();
        state_repo.expect_load().never();

        let loader = WorldStateLoader::new(Arc::new(worlds), Arc::new(state_repo));
        let err = loader.load_world_state(WorldId::new(42)).await.unwrap_err();
        assert!(matches!(err, TurnError::WorldNotFound(id) if id == WorldId::new(42)));
    }

    #[tokio::test]
    async fn hydrates_records_for_existing_world() {
        let mut worlds = MockWorldRepo::new();
        worlds.expect_get().returning(|id| Ok(Some(world(id.get()))));
        let mut state_repo = MockWorldStateRepo::new();
        state_repo
            .expect_load()
            .with(eq(WorldId::new(1)))
            .returning(|world_id| {
                Ok(WorldRecords {
                    generals: vec![General::new(GeneralId::new(9), world_id, "Ma Chao", Utc::now())],
                    ..WorldRecords::default()
                })
            });

        let loader = WorldStateLoader::new(Arc::new(worlds), Arc::new(state_repo));
        let state = loader.load_world_state(WorldId::new(1)).await.unwrap();
        assert_eq!(state.world_id, WorldId::new(1));
        assert!(state.generals.contains_key(&GeneralId::new(9)));
    }

    #[tokio::test]
    async fn storage_errors_propagate() {
        let mut worlds = MockWorldRepo::new();
        worlds.expect_get().returning(|id| Ok(Some(world(id.get()))));
        let mut state_repo = MockWorldStateRepo::new();
        state_repo
            .expect_load()
            .returning(|_| Err(RepoError::database("load", "connection reset")));

        let loader = WorldStateLoader::new(Arc::new(worlds), Arc::new(state_repo));
        let err = loader.load_world_state(WorldId::new(1)).await.unwrap_err();
        assert!(matches!(err, TurnError::Repo(RepoError::Database { .. })));
    }
}
