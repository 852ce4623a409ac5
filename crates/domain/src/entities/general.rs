//! General entity - a player- or NPC-controlled agent inside a world.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::AuxMap;
use crate::{CityId, GeneralId, NationId, TroopId, WorldId};

/// `npc_state` at or above which the general is driven by the AI.
pub const NPC_STATE_AI: i16 = 2;
/// `npc_state` of a general that left service and wanders.
pub const NPC_STATE_WANDERER: i16 = 5;
/// `block_state` at or above which the general's commands are frozen.
pub const BLOCK_STATE_FROZEN: i16 = 2;
/// Lowest `officer_level` that issues nation-level commands.
pub const OFFICER_LEVEL_CHIEF: i16 = 5;

/// Working record for one general.
///
/// Fields are public: command execution and triggers mutate them directly,
/// and every mutation must be paired with a dirty mark by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct General {
    pub id: GeneralId,
    pub world_id: WorldId,
    pub name: String,

    // Affiliation
    pub nation_id: NationId,
    pub city_id: CityId,
    pub troop_id: Option<TroopId>,
    pub officer_level: i16,
    pub npc_state: i16,

    // Stats
    pub leadership: i16,
    pub strength: i16,
    pub intel: i16,
    pub politics: i16,
    pub charm: i16,
    pub injury: i16,
    pub experience: i32,
    pub dedication: i32,

    // Resources and army
    pub gold: i32,
    pub rice: i32,
    pub crew: i32,
    pub crew_type: i16,
    pub train: i16,
    pub atmos: i16,

    // Turn bookkeeping
    pub block_state: i16,
    pub kill_turn: Option<i32>,
    pub turn_time: DateTime<Utc>,
    pub command_points: i32,
    pub last_turn: AuxMap,
    pub meta: AuxMap,
    pub updated_at: DateTime<Utc>,
}

impl General {
    /// A fresh, unaffiliated general with neutral stats.
    pub fn new(
        id: GeneralId,
        world_id: WorldId,
        name: impl Into<String>,
        turn_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            world_id,
            name: name.into(),
            nation_id: NationId::NONE,
            city_id: CityId::default(),
            troop_id: None,
            officer_level: 0,
            npc_state: 0,
            leadership: 50,
            strength: 50,
            intel: 50,
            politics: 50,
            charm: 50,
            injury: 0,
            experience: 0,
            dedication: 0,
            gold: 1000,
            rice: 1000,
            crew: 0,
            crew_type: 0,
            train: 0,
            atmos: 0,
            block_state: 0,
            kill_turn: None,
            turn_time,
            command_points: 0,
            last_turn: AuxMap::new(),
            meta: AuxMap::new(),
            updated_at: turn_time,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.block_state >= BLOCK_STATE_FROZEN
    }

    pub fn is_ai_controlled(&self) -> bool {
        self.npc_state >= NPC_STATE_AI
    }

    /// Chiefs of a nation pop the nation command queue on their turn.
    pub fn issues_nation_commands(&self) -> bool {
        self.officer_level >= OFFICER_LEVEL_CHIEF && !self.nation_id.is_none()
    }

    /// Leave the nation and turn into a wanderer.
    ///
    /// `officer_level` is kept as it was; without a nation it no longer
    /// grants nation commands.
    pub fn leave_service(&mut self) {
        self.npc_state = NPC_STATE_WANDERER;
        self.nation_id = NationId::NONE;
        self.kill_turn = None;
    }
}
