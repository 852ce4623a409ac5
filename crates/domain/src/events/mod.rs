//! Domain Events
//!
//! [`TurnDomainEvent`] is what a turn pass reports: a type tag plus an open
//! payload, consumed once by the coordinator. [`GameEvent`] is the typed
//! notification handed to broadcast subscribers after publication.

use serde::{Deserialize, Serialize};

use crate::value_objects::{AuxMap, AuxMapExt, AuxValue};
use crate::WorldId;

/// Type tag of the event emitted each time a world's calendar advances.
pub const EVENT_TURN_ADVANCED: &str = "TURN_ADVANCED";

/// Something that happened during one turn pass.
///
/// Only [`EVENT_TURN_ADVANCED`] is interpreted by the coordinator; other
/// event types pass through opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnDomainEvent {
    pub event_type: String,
    pub payload: AuxMap,
}

impl TurnDomainEvent {
    pub fn new(event_type: impl Into<String>, payload: AuxMap) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    pub fn turn_advanced(world_id: WorldId, year: i32, month: u8) -> Self {
        let mut payload = AuxMap::new();
        payload.insert("worldId".into(), AuxValue::Int(world_id.get()));
        payload.insert("year".into(), AuxValue::Int(i64::from(year)));
        payload.insert("month".into(), AuxValue::Int(i64::from(month)));
        Self::new(EVENT_TURN_ADVANCED, payload)
    }

    pub fn is_turn_advanced(&self) -> bool {
        self.event_type == EVENT_TURN_ADVANCED
    }

    /// `(year, month)` of a turn-advanced event.
    ///
    /// `None` when either field is missing, not an integer, or out of range.
    pub fn calendar(&self) -> Option<(i32, u8)> {
        let year = i32::try_from(self.payload.get_int("year")?).ok()?;
        let month = u8::try_from(self.payload.get_int("month")?).ok()?;
        Some((year, month))
    }
}

/// Immutable output of one processing pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResult {
    pub advanced_turns: u32,
    pub events: Vec<TurnDomainEvent>,
}

impl TurnResult {
    pub fn new(advanced_turns: u32, events: Vec<TurnDomainEvent>) -> Self {
        Self {
            advanced_turns,
            events,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.advanced_turns == 0 && self.events.is_empty()
    }
}

/// Notification fanned out to downstream subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    #[serde(rename_all = "camelCase")]
    TurnAdvanced {
        world_id: WorldId,
        year: i32,
        month: u8,
    },
}

impl GameEvent {
    pub fn world_id(&self) -> WorldId {
        match self {
            Self::TurnAdvanced { world_id, .. } => *world_id,
        }
    }
}
