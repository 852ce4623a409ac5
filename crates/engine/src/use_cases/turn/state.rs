//! Fully materialized working set for one world.

use std::collections::{BTreeMap, VecDeque};

use warband_domain::{
    City, CityId, Diplomacy, DiplomacyId, General, GeneralId, GeneralTurn, Nation, NationId,
    NationTurn, NationTurnKey, Troop, TroopId, WorldId,
};

use crate::infrastructure::ports::WorldRecords;

/// Everything a pass may read or mutate, held in memory.
///
/// Maps are ordered so that iteration, and therefore processing and write
/// order, is deterministic. Queues are ordered by `turn_idx`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryWorldState {
    pub world_id: WorldId,
    pub generals: BTreeMap<GeneralId, General>,
    pub cities: BTreeMap<CityId, City>,
    pub nations: BTreeMap<NationId, Nation>,
    pub troops: BTreeMap<TroopId, Troop>,
    pub diplomacies: BTreeMap<DiplomacyId, Diplomacy>,
    pub general_turns: BTreeMap<GeneralId, VecDeque<GeneralTurn>>,
    pub nation_turns: BTreeMap<NationTurnKey, VecDeque<NationTurn>>,
}

impl InMemoryWorldState {
    /// Index raw rows and group queued commands by owner.
    pub fn from_records(world_id: WorldId, records: WorldRecords) -> Self {
        let WorldRecords {
            generals,
            cities,
            nations,
            troops,
            diplomacies,
            mut general_turns,
            mut nation_turns,
        } = records;

        general_turns.sort_by_key(|t| (t.general_id, t.turn_idx));
        nation_turns.sort_by_key(|t| (t.key(), t.turn_idx));

        let mut state = Self {
            world_id,
            generals: generals.into_iter().map(|g| (g.id, g)).collect(),
            cities: cities.into_iter().map(|c| (c.id, c)).collect(),
            nations: nations.into_iter().map(|n| (n.id, n)).collect(),
            troops: troops.into_iter().map(|t| (t.id, t)).collect(),
            diplomacies: diplomacies.into_iter().map(|d| (d.id, d)).collect(),
            general_turns: BTreeMap::new(),
            nation_turns: BTreeMap::new(),
        };
        for turn in general_turns {
            state
                .general_turns
                .entry(turn.general_id)
                .or_default()
                .push_back(turn);
        }
        for turn in nation_turns {
            state.nation_turns.entry(turn.key()).or_default().push_back(turn);
        }
        state
    }

    /// Take the next reserved command of a general.
    pub fn pop_general_turn(&mut self, general_id: GeneralId) -> Option<GeneralTurn> {
        self.general_turns.get_mut(&general_id)?.pop_front()
    }

    /// Drop every reserved command of a general. Returns whether any existed.
    pub fn clear_general_queue(&mut self, general_id: GeneralId) -> bool {
        self.general_turns
            .remove(&general_id)
            .is_some_and(|queue| !queue.is_empty())
    }

    /// Take the next reserved command of a nation officer.
    pub fn pop_nation_turn(&mut self, key: NationTurnKey) -> Option<NationTurn> {
        self.nation_turns.get_mut(&key)?.pop_front()
    }

    /// Remaining commands of a general, renumbered from zero.
    pub fn general_queue(&self, general_id: GeneralId) -> Vec<GeneralTurn> {
        self.general_turns
            .get(&general_id)
            .map(|queue| {
                queue
                    .iter()
                    .zip(0_i16..)
                    .map(|(turn, idx)| GeneralTurn {
                        turn_idx: idx,
                        ..turn.clone()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remaining commands of every officer rank of a nation, each rank
    /// renumbered from zero.
    pub fn nation_queue(&self, nation_id: NationId) -> Vec<NationTurn> {
        self.nation_turns
            .iter()
            .filter(|(key, _)| key.nation_id == nation_id)
            .flat_map(|(_, queue)| {
                queue.iter().zip(0_i16..).map(|(turn, idx)| NationTurn {
                    turn_idx: idx,
                    ..turn.clone()
                })
            })
            .collect()
    }

    /// General ids in processing order: earliest `turn_time` first, then id.
    pub fn generals_by_turn_time(&self) -> Vec<GeneralId> {
        let mut ids: Vec<_> = self
            .generals
            .values()
            .map(|g| (g.turn_time, g.id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }
}
