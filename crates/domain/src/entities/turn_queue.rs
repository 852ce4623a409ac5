//! Reserved commands waiting in general and nation queues.

use serde::{Deserialize, Serialize};

use crate::value_objects::AuxMap;
use crate::{GeneralId, NationId};

/// Action code executed when a general has nothing queued.
pub const ACTION_REST: &str = "rest";

/// One reserved command in a general's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralTurn {
    pub general_id: GeneralId,
    pub turn_idx: i16,
    pub action_code: String,
    pub arg: AuxMap,
    pub brief: Option<String>,
}

impl GeneralTurn {
    pub fn new(general_id: GeneralId, turn_idx: i16, action_code: impl Into<String>) -> Self {
        Self {
            general_id,
            turn_idx,
            action_code: action_code.into(),
            arg: AuxMap::new(),
            brief: None,
        }
    }

    pub fn with_arg(mut self, arg: AuxMap) -> Self {
        self.arg = arg;
        self
    }
}

/// Nation queues are kept per officer rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationTurnKey {
    pub nation_id: NationId,
    pub officer_level: i16,
}

/// One reserved command in a nation officer's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationTurn {
    pub nation_id: NationId,
    pub officer_level: i16,
    pub turn_idx: i16,
    pub action_code: String,
    pub arg: AuxMap,
    pub brief: Option<String>,
}

impl NationTurn {
    pub fn new(
        nation_id: NationId,
        officer_level: i16,
        turn_idx: i16,
        action_code: impl Into<String>,
    ) -> Self {
        Self {
            nation_id,
            officer_level,
            turn_idx,
            action_code: action_code.into(),
            arg: AuxMap::new(),
            brief: None,
        }
    }

    pub fn key(&self) -> NationTurnKey {
        NationTurnKey {
            nation_id: self.nation_id,
            officer_level: self.officer_level,
        }
    }
}
