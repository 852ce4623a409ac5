//! Writes back what a pass changed, and nothing else.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use warband_domain::{GeneralId, NationId, World};

use super::dirty_tracker::{DirtyChanges, DirtyTracker, EntityKind};
use super::error::TurnError;
use super::state::InMemoryWorldState;
use crate::infrastructure::ports::{PersistBatch, WorldStateRepo};

/// Turns the dirty ledger into one [`PersistBatch`] and commits it together
/// with the world row.
pub struct WorldStatePersister {
    world_state: Arc<dyn WorldStateRepo>,
}

impl WorldStatePersister {
    pub fn new(world_state: Arc<dyn WorldStateRepo>) -> Self {
        Self { world_state }
    }

    /// Drain `tracker` and commit every recorded change along with `world`.
    ///
    /// Returns the number of row-level writes besides the world row. The
    /// world row is written even when the ledger is clean.
    pub async fn persist(
        &self,
        state: &InMemoryWorldState,
        tracker: &mut DirtyTracker,
        world: &World,
    ) -> Result<usize, TurnError> {
        let world_id = world.id();
        let changes = tracker.consume_all();
        let batch = build_batch(state, &changes);
        let writes = batch.write_count();
        self.world_state.commit(world, &batch).await?;
        tracing::debug!(
            world_id = %world_id,
            generals = batch.generals.len(),
            nations = batch.nations.len(),
            cities = batch.cities.len(),
            general_queues = batch.general_queues.len(),
            nation_queues = batch.nation_queues.len(),
            writes,
            "Persisted world state"
        );
        Ok(writes)
    }
}

/// Rows present in `rows` for the given ids, in id order.
fn pick<K, V>(rows: &BTreeMap<K, V>, ids: BTreeSet<i64>) -> Vec<V>
where
    K: Ord + From<i64>,
    V: Clone,
{
    ids.into_iter()
        .filter_map(|id| rows.get(&K::from(id)).cloned())
        .collect()
}

fn typed<K: From<i64>>(ids: BTreeSet<i64>) -> Vec<K> {
    ids.into_iter().map(K::from).collect()
}

/// Every queue touched this pass, whether marked dirty or created.
fn touched(changes: &DirtyChanges, kind: EntityKind) -> BTreeSet<i64> {
    changes
        .dirty_ids(kind)
        .into_iter()
        .chain(changes.created_ids(kind))
        .collect()
}

pub(crate) fn build_batch(state: &InMemoryWorldState, changes: &DirtyChanges) -> PersistBatch {
    PersistBatch {
        generals: pick(&state.generals, changes.upsert_ids(EntityKind::General)),
        deleted_generals: typed(changes.deleted_ids(EntityKind::General)),
        cities: pick(&state.cities, changes.upsert_ids(EntityKind::City)),
        deleted_cities: typed(changes.deleted_ids(EntityKind::City)),
        nations: pick(&state.nations, changes.upsert_ids(EntityKind::Nation)),
        deleted_nations: typed(changes.deleted_ids(EntityKind::Nation)),
        troops: pick(&state.troops, changes.upsert_ids(EntityKind::Troop)),
        deleted_troops: typed(changes.deleted_ids(EntityKind::Troop)),
        diplomacies: pick(&state.diplomacies, changes.upsert_ids(EntityKind::Diplomacy)),
        deleted_diplomacies: typed(changes.deleted_ids(EntityKind::Diplomacy)),
        general_queues: touched(changes, EntityKind::GeneralQueue)
            .into_iter()
            .map(GeneralId::from)
            .map(|id| (id, state.general_queue(id)))
            .collect(),
        nation_queues: touched(changes, EntityKind::NationQueue)
            .into_iter()
            .map(NationId::from)
            .map(|id| (id, state.nation_queue(id)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockWorldStateRepo, RepoError, WorldRecords};
    use chrono::Utc;
    use warband_domain::{City, CityId, General, GeneralTurn, Nation, WorldId};

    fn world() -> World {
        World::new(WorldId::new(1), 184, 1, 600, Utc::now()).unwrap()
    }

    fn state() -> InMemoryWorldState {
        let world_id = WorldId::new(1);
        InMemoryWorldState::from_records(
            world_id,
            WorldRecords {
                generals: (1..=3)
                    .map(|id| General::new(GeneralId::new(id), world_id, "g", Utc::now()))
                    .collect(),
                cities: vec![City::new(CityId::new(10), world_id, "Chengdu")],
                nations: vec![Nation::new(NationId::new(5), world_id, "Shu")],
                general_turns: vec![
                    GeneralTurn::new(GeneralId::new(2), 0, "farm"),
                    GeneralTurn::new(GeneralId::new(2), 1, "train"),
                ],
                ..WorldRecords::default()
            },
        )
    }

    #[tokio::test]
    async fn clean_tracker_still_commits_the_world_row() {
        let mut repo = MockWorldStateRepo::new();
        repo.expect_commit()
            .times(1)
            .withf(|world, batch| world.id() == WorldId::new(1) && batch.is_empty())
            .returning(|_, _| Ok(()));
        let persister = WorldStatePersister::new(Arc::new(repo));

        let writes = persister
            .persist(&state(), &mut DirtyTracker::new(), &world())
            .await
            .unwrap();

        assert_eq!(writes, 0);
    }

    #[tokio::test]
    async fn only_dirty_entities_are_written() {
        let mut repo = MockWorldStateRepo::new();
        repo.expect_commit()
            .times(1)
            .withf(|world, batch| {
                world.id() == WorldId::new(1)
                    && batch.generals.iter().map(|g| g.id.get()).collect::<Vec<_>>() == vec![1, 3]
                    && batch.cities.is_empty()
                    && batch.nations.len() == 1
                    && batch.general_queues.is_empty()
            })
            .returning(|_, _| Ok(()));
        let persister = WorldStatePersister::new(Arc::new(repo));

        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty(EntityKind::General, GeneralId::new(3));
        tracker.mark_dirty(EntityKind::General, GeneralId::new(1));
        tracker.mark_dirty(EntityKind::General, GeneralId::new(1));
        tracker.mark_dirty(EntityKind::Nation, NationId::new(5));

        let writes = persister
            .persist(&state(), &mut tracker, &world())
            .await
            .unwrap();

        assert_eq!(writes, 3);
        assert!(tracker.is_clean());
    }

    #[tokio::test]
    async fn commit_failure_surfaces() {
        let mut repo = MockWorldStateRepo::new();
        repo.expect_commit()
            .returning(|_, _| Err(RepoError::database("commit", "disk full")));
        let persister = WorldStatePersister::new(Arc::new(repo));

        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty(EntityKind::City, CityId::new(10));

        let err = persister
            .persist(&state(), &mut tracker, &world())
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::Repo(_)));
    }

    #[test]
    fn queue_changes_carry_the_remaining_queue() {
        let mut state = state();
        state.pop_general_turn(GeneralId::new(2));
        state.clear_general_queue(GeneralId::new(3));

        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty(EntityKind::GeneralQueue, GeneralId::new(2));
        tracker.mark_dirty(EntityKind::GeneralQueue, GeneralId::new(3));
        let batch = build_batch(&state, &tracker.consume_all());

        assert_eq!(batch.general_queues.len(), 2);
        let (owner, remaining) = &batch.general_queues[0];
        assert_eq!(*owner, GeneralId::new(2));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].action_code, "train");
        assert_eq!(remaining[0].turn_idx, 0);
        assert_eq!(batch.general_queues[1], (GeneralId::new(3), Vec::new()));
    }

    #[test]
    fn deletes_win_over_upserts() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty(EntityKind::General, GeneralId::new(2));
        tracker.mark_deleted(EntityKind::General, GeneralId::new(2));
        tracker.mark_created(EntityKind::General, GeneralId::new(99));

        let batch = build_batch(&state(), &tracker.consume_all());

        assert!(batch.generals.is_empty());
        assert_eq!(batch.deleted_generals, vec![GeneralId::new(2)]);
    }
}
