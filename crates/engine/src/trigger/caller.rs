//! Priority-ordered trigger chain.
//!
//! Triggers are small, named actions that modify command or stat behavior.
//! A [`TriggerCaller`] keeps at most one trigger per unique id and fires them
//! in ascending priority (lower = earlier); ties fire in unique-id order.

use std::collections::BTreeMap;

use warband_domain::{AuxMap, General, GeneralId, World, WorldId};

/// Conventional priority bands. The chain only needs a total order on the
/// numeric value, membership in a band is not required.
pub struct TriggerPriority;

impl TriggerPriority {
    pub const BEGIN: i32 = 10_000;
    pub const PRE: i32 = 20_000;
    pub const BODY: i32 = 30_000;
    pub const POST: i32 = 40_000;
    pub const FINAL: i32 = 50_000;
}

/// An unexpected failure inside a trigger action.
///
/// Declining to continue the chain is not an error; actions return
/// `Ok(false)` for that.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Trigger {trigger_id} failed: {message}")]
    Action { trigger_id: String, message: String },
}

impl TriggerError {
    pub fn action(trigger_id: impl Into<String>, message: impl ToString) -> Self {
        Self::Action {
            trigger_id: trigger_id.into(),
            message: message.to_string(),
        }
    }
}

/// Mutable context for one `fire` call.
///
/// Never shared: it is built for one firing, optionally borrowing the
/// targeted general exclusively so actions can mutate it.
#[derive(Debug)]
pub struct TriggerEnv<'g> {
    pub world_id: WorldId,
    pub year: i32,
    pub month: u8,
    pub general_id: GeneralId,
    pub vars: AuxMap,
    pub stop_next_action: bool,
    general: Option<&'g mut General>,
}

impl<'g> TriggerEnv<'g> {
    pub fn new(world_id: WorldId, year: i32, month: u8, general_id: GeneralId) -> Self {
        Self {
            world_id,
            year,
            month,
            general_id,
            vars: AuxMap::new(),
            stop_next_action: false,
            general: None,
        }
    }

    /// Env positioned at the world's current calendar, targeting `general`.
    pub fn for_general(world: &World, general: &'g mut General) -> Self {
        Self {
            world_id: world.id(),
            year: world.current_year(),
            month: world.current_month(),
            general_id: general.id,
            vars: AuxMap::new(),
            stop_next_action: false,
            general: Some(general),
        }
    }

    pub fn general(&self) -> Option<&General> {
        self.general.as_deref()
    }

    pub fn general_mut(&mut self) -> Option<&mut General> {
        self.general.as_deref_mut()
    }
}

/// A single trigger action with a unique ID and priority.
pub trait ObjectTrigger: Send + Sync {
    fn unique_id(&self) -> &str;

    fn priority(&self) -> i32;

    /// Run the trigger. `Ok(false)` stops every later trigger in this firing.
    fn action(&self, env: &mut TriggerEnv<'_>) -> Result<bool, TriggerError>;
}

/// Deduplicating registry that fires triggers in priority order.
///
/// Generic over the trigger capability so a caller of
/// `dyn GeneralTrigger` can also fold the calculation hooks.
pub struct TriggerCaller<T: ?Sized + ObjectTrigger = dyn ObjectTrigger> {
    triggers: BTreeMap<String, Box<T>>,
}

impl<T: ?Sized + ObjectTrigger> TriggerCaller<T> {
    pub fn new() -> Self {
        Self {
            triggers: BTreeMap::new(),
        }
    }

    /// Insert a trigger, replacing any earlier one with the same unique id.
    pub fn add_trigger(&mut self, trigger: Box<T>) {
        let id = trigger.unique_id().to_string();
        if self.triggers.insert(id.clone(), trigger).is_some() {
            tracing::trace!(trigger_id = %id, "Replaced trigger with same unique id");
        }
    }

    pub fn add_all(&mut self, triggers: impl IntoIterator<Item = Box<T>>) {
        for trigger in triggers {
            self.add_trigger(trigger);
        }
    }

    /// Triggers in firing order: ascending priority, then unique id.
    pub fn ordered(&self) -> Vec<&T> {
        // BTreeMap iterates by id; the stable sort keeps that as tie-break.
        let mut ordered: Vec<&T> = self.triggers.values().map(|t| t.as_ref()).collect();
        ordered.sort_by_key(|t| t.priority());
        ordered
    }

    /// Fire every trigger in order until one declines to continue.
    ///
    /// A trigger is skipped once `env.stop_next_action` is set, whether it
    /// was set by an earlier trigger or before the call. Errors from an
    /// action abort the firing and are returned as-is.
    pub fn fire(&self, env: &mut TriggerEnv<'_>) -> Result<(), TriggerError> {
        for trigger in self.ordered() {
            if env.stop_next_action {
                break;
            }
            if !trigger.action(env)? {
                env.stop_next_action = true;
            }
        }
        Ok(())
    }

    pub fn contains(&self, unique_id: &str) -> bool {
        self.triggers.contains_key(unique_id)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

impl<T: ?Sized + ObjectTrigger> Default for TriggerCaller<T> {
    fn default() -> Self {
        Self::new()
    }
}
