//! Trigger chain - prioritized, pluggable modifiers for turn execution.
//!
//! - `caller` - the deduplicating, priority-ordered registry and its env
//! - `general` - general-scoped triggers with calculation hooks
//! - `modifier` - action modifiers and the registry that selects them per general
//! - `nation_type` - the built-in nation type table

pub mod caller;
pub mod general;
pub mod modifier;
pub mod nation_type;

pub use caller::{ObjectTrigger, TriggerCaller, TriggerEnv, TriggerError, TriggerPriority};
pub use general::{
    apply_domestic_modifiers, apply_stat_modifiers, build_pre_turn_triggers, GeneralTrigger,
    InjuryReductionTrigger, TroopConsumptionTrigger,
};
pub use modifier::{
    ActionModifier, DomesticContext, DomesticVar, ModifierRegistry, ModifierSet, StatContext,
    StatVar,
};
pub use nation_type::{NationType, NATION_TYPES};
