//! Value objects shared by aggregates, triggers and events.

mod aux_value;

pub use aux_value::{AuxMap, AuxMapExt, AuxValue};
