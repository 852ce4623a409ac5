//! Nation, city, troop and diplomacy records.
//!
//! The turn pass mostly carries these through untouched; they are persisted
//! only when a command or trigger marks them dirty.

use serde::{Deserialize, Serialize};

use crate::value_objects::AuxMap;
use crate::{CityId, DiplomacyId, GeneralId, NationId, TroopId, WorldId};

/// Nation type of a freshly founded nation; carries no modifiers.
pub const NATION_TYPE_NEUTRAL: &str = "che_중립";

fn neutral_type() -> String {
    NATION_TYPE_NEUTRAL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nation {
    pub id: NationId,
    pub world_id: WorldId,
    pub name: String,
    /// Nation type code selecting the nation's action modifiers.
    #[serde(default = "neutral_type")]
    pub type_code: String,
    pub capital_city_id: Option<CityId>,
    pub chief_general_id: Option<GeneralId>,
    pub gold: i32,
    pub rice: i32,
    pub tech: f32,
    pub level: i16,
    /// Turns left before another strategic command may be issued.
    pub strategic_cmd_limit: i16,
    pub meta: AuxMap,
}

impl Nation {
    pub fn new(id: NationId, world_id: WorldId, name: impl Into<String>) -> Self {
        Self {
            id,
            world_id,
            name: name.into(),
            type_code: neutral_type(),
            capital_city_id: None,
            chief_general_id: None,
            gold: 0,
            rice: 0,
            tech: 0.0,
            level: 0,
            strategic_cmd_limit: 0,
            meta: AuxMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: CityId,
    pub world_id: WorldId,
    pub name: String,
    pub nation_id: NationId,
    pub pop: i32,
    pub agri: i32,
    pub comm: i32,
    pub secu: i32,
    pub def: i32,
    pub wall: i32,
    pub meta: AuxMap,
}

impl City {
    pub fn new(id: CityId, world_id: WorldId, name: impl Into<String>) -> Self {
        Self {
            id,
            world_id,
            name: name.into(),
            nation_id: NationId::NONE,
            pop: 0,
            agri: 0,
            comm: 0,
            secu: 0,
            def: 0,
            wall: 0,
            meta: AuxMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Troop {
    pub id: TroopId,
    pub world_id: WorldId,
    pub leader_general_id: GeneralId,
    pub nation_id: NationId,
    pub name: String,
    pub meta: AuxMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diplomacy {
    pub id: DiplomacyId,
    pub world_id: WorldId,
    pub src_nation_id: NationId,
    pub dest_nation_id: NationId,
    pub state_code: i16,
    pub term: i16,
    pub meta: AuxMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_without_type_code_decode_as_neutral() {
        let nation = Nation::new(NationId::new(1), WorldId::new(1), "Shu");
        let mut body = serde_json::to_value(&nation).expect("serialize");
        body.as_object_mut().expect("object").remove("typeCode");

        let decoded: Nation = serde_json::from_value(body).expect("deserialize");
        assert_eq!(decoded.type_code, NATION_TYPE_NEUTRAL);
        assert_eq!(decoded, nation);
    }
}
