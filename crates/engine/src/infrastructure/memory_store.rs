//! Volatile world storage.
//!
//! Useful for local runs and tests. A commit applies under a single write
//! guard, so readers see either none or all of a batch.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use warband_domain::{
    City, CityId, Diplomacy, DiplomacyId, General, GeneralId, GeneralTurn, Nation, NationId,
    NationTurn, Troop, TroopId, World, WorldId,
};

use crate::infrastructure::ports::{
    PersistBatch, RepoError, WorldRecords, WorldRepo, WorldStateRepo,
};

#[derive(Debug, Default)]
struct WorldRows {
    generals: BTreeMap<GeneralId, General>,
    cities: BTreeMap<CityId, City>,
    nations: BTreeMap<NationId, Nation>,
    troops: BTreeMap<TroopId, Troop>,
    diplomacies: BTreeMap<DiplomacyId, Diplomacy>,
    general_turns: BTreeMap<GeneralId, Vec<GeneralTurn>>,
    nation_turns: BTreeMap<NationId, Vec<NationTurn>>,
}

impl WorldRows {
    fn snapshot(&self) -> WorldRecords {
        WorldRecords {
            generals: self.generals.values().cloned().collect(),
            cities: self.cities.values().cloned().collect(),
            nations: self.nations.values().cloned().collect(),
            troops: self.troops.values().cloned().collect(),
            diplomacies: self.diplomacies.values().cloned().collect(),
            general_turns: self.general_turns.values().flatten().cloned().collect(),
            nation_turns: self.nation_turns.values().flatten().cloned().collect(),
        }
    }

    fn apply(&mut self, batch: &PersistBatch) {
        upsert(&mut self.generals, &batch.generals, |g| g.id);
        remove(&mut self.generals, &batch.deleted_generals);
        upsert(&mut self.cities, &batch.cities, |c| c.id);
        remove(&mut self.cities, &batch.deleted_cities);
        upsert(&mut self.nations, &batch.nations, |n| n.id);
        remove(&mut self.nations, &batch.deleted_nations);
        upsert(&mut self.troops, &batch.troops, |t| t.id);
        remove(&mut self.troops, &batch.deleted_troops);
        upsert(&mut self.diplomacies, &batch.diplomacies, |d| d.id);
        remove(&mut self.diplomacies, &batch.deleted_diplomacies);

        for (general_id, queue) in &batch.general_queues {
            replace_queue(&mut self.general_turns, *general_id, queue);
        }
        for (nation_id, queue) in &batch.nation_queues {
            replace_queue(&mut self.nation_turns, *nation_id, queue);
        }
    }
}

fn upsert<K: Ord, V: Clone>(rows: &mut BTreeMap<K, V>, items: &[V], key: impl Fn(&V) -> K) {
    for item in items {
        rows.insert(key(item), item.clone());
    }
}

fn remove<K: Ord, V>(rows: &mut BTreeMap<K, V>, ids: &[K]) {
    for id in ids {
        rows.remove(id);
    }
}

fn replace_queue<K: Ord, V: Clone>(queues: &mut BTreeMap<K, Vec<V>>, owner: K, queue: &[V]) {
    if queue.is_empty() {
        queues.remove(&owner);
    } else {
        queues.insert(owner, queue.to_vec());
    }
}

#[derive(Debug, Default)]
struct Inner {
    worlds: BTreeMap<WorldId, World>,
    rows: BTreeMap<WorldId, WorldRows>,
}

/// [`WorldRepo`] and [`WorldStateRepo`] held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryWorldStore {
    inner: RwLock<Inner>,
}

impl InMemoryWorldStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorldRepo for InMemoryWorldStore {
    async fn get(&self, id: WorldId) -> Result<Option<World>, RepoError> {
        Ok(self.inner.read().await.worlds.get(&id).cloned())
    }

    async fn save(&self, world: &World) -> Result<(), RepoError> {
        self.inner
            .write()
            .await
            .worlds
            .insert(world.id(), world.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<World>, RepoError> {
        Ok(self.inner.read().await.worlds.values().cloned().collect())
    }
}

#[async_trait]
impl WorldStateRepo for InMemoryWorldStore {
    async fn load(&self, world_id: WorldId) -> Result<WorldRecords, RepoError> {
        Ok(self
            .inner
            .read()
            .await
            .rows
            .get(&world_id)
            .map(WorldRows::snapshot)
            .unwrap_or_default())
    }

    async fn commit(&self, world: &World, batch: &PersistBatch) -> Result<(), RepoError> {
        let mut inner = self.inner.write().await;
        inner.worlds.insert(world.id(), world.clone());
        inner.rows.entry(world.id()).or_default().apply(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn world(id: i64) -> World {
        World::new(WorldId::new(id), 184, 1, 600, Utc::now()).unwrap()
    }

    fn general(id: i64, world_id: WorldId) -> General {
        General::new(GeneralId::new(id), world_id, format!("g{id}"), Utc::now())
    }

    #[tokio::test]
    async fn worlds_round_trip_through_save() {
        let store = InMemoryWorldStore::new();
        assert!(store.get(WorldId::new(1)).await.unwrap().is_none());

        store.save(&world(1)).await.unwrap();
        store.save(&world(2)).await.unwrap();

        let stored = store.get(WorldId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.id(), WorldId::new(1));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn commit_writes_the_world_row_with_the_batch() {
        let store = InMemoryWorldStore::new();
        let mut advanced = world(9);
        advanced.advance_month();

        store.commit(&advanced, &PersistBatch::default()).await.unwrap();

        let stored = store.get(WorldId::new(9)).await.unwrap().unwrap();
        assert_eq!(stored.current_month(), 2);
    }

    #[tokio::test]
    async fn commit_applies_upserts_deletes_and_queues() {
        let store = InMemoryWorldStore::new();
        let world_id = WorldId::new(1);
        store.save(&world(1)).await.unwrap();
        store
            .commit(
                &world(1),
                &PersistBatch {
                    generals: vec![general(1, world_id), general(2, world_id)],
                    general_queues: vec![(
                        GeneralId::new(1),
                        vec![GeneralTurn::new(GeneralId::new(1), 0, "farm")],
                    )],
                    ..PersistBatch::default()
                },
            )
            .await
            .unwrap();

        let mut renamed = general(1, world_id);
        renamed.name = "Liu Bei".into();
        store
            .commit(
                &world(1),
                &PersistBatch {
                    generals: vec![renamed],
                    deleted_generals: vec![GeneralId::new(2)],
                    general_queues: vec![(GeneralId::new(1), Vec::new())],
                    ..PersistBatch::default()
                },
            )
            .await
            .unwrap();

        let records = store.load(world_id).await.unwrap();
        assert_eq!(records.generals.len(), 1);
        assert_eq!(records.generals[0].name, "Liu Bei");
        assert!(records.general_turns.is_empty());
    }

    #[tokio::test]
    async fn worlds_are_isolated() {
        let store = InMemoryWorldStore::new();
        store.save(&world(1)).await.unwrap();
        store.save(&world(2)).await.unwrap();
        store
            .commit(
                &world(1),
                &PersistBatch {
                    generals: vec![general(1, WorldId::new(1))],
                    ..PersistBatch::default()
                },
            )
            .await
            .unwrap();

        assert!(store.load(WorldId::new(2)).await.unwrap().generals.is_empty());
        assert_eq!(store.load(WorldId::new(1)).await.unwrap().generals.len(), 1);
    }
}
