//! Warband domain model.
//!
//! Pure data for the turn pipeline: world calendar, generals and the other
//! records a world pass loads, typed extension values, turn events and the
//! lifecycle vocabulary. No I/O, no async.

extern crate self as warband_domain;

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod types;
pub mod value_objects;

pub use aggregates::{World, META_COMMIT_SHA, META_GATEWAY_ACTIVE};
pub use entities::{
    City, Diplomacy, General, GeneralTurn, Nation, NationTurn, NationTurnKey, Troop, ACTION_REST,
    BLOCK_STATE_FROZEN, NATION_TYPE_NEUTRAL, NPC_STATE_AI, NPC_STATE_WANDERER,
    OFFICER_LEVEL_CHIEF,
};
pub use error::DomainError;
pub use events::{GameEvent, TurnDomainEvent, TurnResult, EVENT_TURN_ADVANCED};
pub use ids::{CityId, DiplomacyId, GeneralId, NationId, TroopId, WorldId};
pub use types::TurnLifecycleState;
pub use value_objects::{AuxMap, AuxMapExt, AuxValue};
