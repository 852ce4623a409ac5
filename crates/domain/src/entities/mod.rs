//! Entities loaded into a world's working set.

mod general;
mod nation;
mod turn_queue;

pub use general::{
    General, BLOCK_STATE_FROZEN, NPC_STATE_AI, NPC_STATE_WANDERER, OFFICER_LEVEL_CHIEF,
};
pub use nation::{City, Diplomacy, Nation, Troop, NATION_TYPE_NEUTRAL};
pub use turn_queue::{GeneralTurn, NationTurn, NationTurnKey, ACTION_REST};
