//! Helper types for port operations.

use warband_domain::{
    City, CityId, Diplomacy, DiplomacyId, General, GeneralId, GeneralTurn, Nation, NationId,
    NationTurn, Troop, TroopId,
};

/// Every stored row belonging to one world, as returned by a single load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldRecords {
    pub generals: Vec<General>,
    pub cities: Vec<City>,
    pub nations: Vec<Nation>,
    pub troops: Vec<Troop>,
    pub diplomacies: Vec<Diplomacy>,
    pub general_turns: Vec<GeneralTurn>,
    pub nation_turns: Vec<NationTurn>,
}

/// Writes produced by one turn pass, applied as a single unit of work.
///
/// Lists are in ascending id order. Queue replacements carry the owner's
/// complete remaining queue; an empty list clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistBatch {
    pub generals: Vec<General>,
    pub deleted_generals: Vec<GeneralId>,
    pub cities: Vec<City>,
    pub deleted_cities: Vec<CityId>,
    pub nations: Vec<Nation>,
    pub deleted_nations: Vec<NationId>,
    pub troops: Vec<Troop>,
    pub deleted_troops: Vec<TroopId>,
    pub diplomacies: Vec<Diplomacy>,
    pub deleted_diplomacies: Vec<DiplomacyId>,
    pub general_queues: Vec<(GeneralId, Vec<GeneralTurn>)>,
    pub nation_queues: Vec<(NationId, Vec<NationTurn>)>,
}

impl PersistBatch {
    /// Number of row-level operations in the batch (upserts, deletes and
    /// replaced queues).
    pub fn write_count(&self) -> usize {
        self.generals.len()
            + self.deleted_generals.len()
            + self.cities.len()
            + self.deleted_cities.len()
            + self.nations.len()
            + self.deleted_nations.len()
            + self.troops.len()
            + self.deleted_troops.len()
            + self.diplomacies.len()
            + self.deleted_diplomacies.len()
            + self.general_queues.len()
            + self.nation_queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.write_count() == 0
    }
}
