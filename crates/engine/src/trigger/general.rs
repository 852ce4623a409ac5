//! General command triggers.
//!
//! A [`GeneralTrigger`] is an [`ObjectTrigger`] that can also adjust
//! domestic-command parameters and stat calculations. Both hooks default to
//! identity, so a trigger that only overrides `action` leaves every
//! calculation untouched.

use warband_domain::{AuxMap, AuxValue, General};

use super::caller::{ObjectTrigger, TriggerCaller, TriggerEnv, TriggerError, TriggerPriority};

/// Trigger with calculation hooks for one general.
pub trait GeneralTrigger: ObjectTrigger {
    /// Adjust a domestic command parameter.
    ///
    /// * `command_key` - command being prepared (e.g. `"farm"`, `"draft"`)
    /// * `var_key` - parameter to adjust (`cost`, `success`, `fail`, `score`, `train`, `atmos`)
    /// * `value` - current value, the previous trigger's output when chained
    /// * `aux` - extra context that does not fit the signature (e.g. `armType`)
    fn on_calc_domestic(
        &self,
        _general: &General,
        _command_key: &str,
        _var_key: &str,
        value: f64,
        _aux: &AuxMap,
    ) -> f64 {
        value
    }

    /// Adjust a stat calculation (`leadership`, `warPower`, `expMultiplier`, ...).
    fn on_calc_stat(&self, _general: &General, _stat_key: &str, value: f64, _aux: &AuxMap) -> f64 {
        value
    }
}

impl TriggerCaller<dyn GeneralTrigger> {
    /// Fold every registered trigger's domestic hook in firing order.
    pub fn calc_domestic(
        &self,
        general: &General,
        command_key: &str,
        var_key: &str,
        base_value: f64,
        aux: &AuxMap,
    ) -> f64 {
        self.ordered().into_iter().fold(base_value, |value, trigger| {
            trigger.on_calc_domestic(general, command_key, var_key, value, aux)
        })
    }

    /// Fold every registered trigger's stat hook in firing order.
    pub fn calc_stat(&self, general: &General, stat_key: &str, base_value: f64, aux: &AuxMap) -> f64 {
        self.ordered().into_iter().fold(base_value, |value, trigger| {
            trigger.on_calc_stat(general, stat_key, value, aux)
        })
    }
}

/// Apply `on_calc_domestic` across a list of triggers in priority order.
pub fn apply_domestic_modifiers(
    triggers: &[Box<dyn GeneralTrigger>],
    general: &General,
    command_key: &str,
    var_key: &str,
    base_value: f64,
    aux: &AuxMap,
) -> f64 {
    let mut ordered: Vec<&dyn GeneralTrigger> = triggers.iter().map(|t| t.as_ref()).collect();
    ordered.sort_by_key(|t| t.priority());
    ordered.into_iter().fold(base_value, |value, trigger| {
        trigger.on_calc_domestic(general, command_key, var_key, value, aux)
    })
}

/// Apply `on_calc_stat` across a list of triggers in priority order.
pub fn apply_stat_modifiers(
    triggers: &[Box<dyn GeneralTrigger>],
    general: &General,
    stat_key: &str,
    base_value: f64,
    aux: &AuxMap,
) -> f64 {
    let mut ordered: Vec<&dyn GeneralTrigger> = triggers.iter().map(|t| t.as_ref()).collect();
    ordered.sort_by_key(|t| t.priority());
    ordered.into_iter().fold(base_value, |value, trigger| {
        trigger.on_calc_stat(general, stat_key, value, aux)
    })
}

// ========== Built-in General Triggers ==========

/// Heals one point of injury each turn.
pub struct InjuryReductionTrigger;

impl InjuryReductionTrigger {
    pub const ID: &'static str = "injury_reduction";
}

impl ObjectTrigger for InjuryReductionTrigger {
    fn unique_id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        TriggerPriority::BEGIN
    }

    fn action(&self, env: &mut TriggerEnv<'_>) -> Result<bool, TriggerError> {
        let Some(general) = env.general_mut() else {
            return Ok(true);
        };
        if general.injury > 0 {
            general.injury -= 1;
            env.vars.insert("injuryReduced".into(), AuxValue::Bool(true));
        }
        Ok(true)
    }
}

impl GeneralTrigger for InjuryReductionTrigger {}

/// Feeds the general's troops each turn.
///
/// Consumes `crew / 100` rice (at least 1 while any crew remains). When the
/// general cannot pay, rice drops to zero and morale falls by up to 5.
pub struct TroopConsumptionTrigger;

impl TroopConsumptionTrigger {
    pub const ID: &'static str = "troop_consumption";
    const MAX_ATMOS_DROP: i16 = 5;
}

impl ObjectTrigger for TroopConsumptionTrigger {
    fn unique_id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        TriggerPriority::FINAL
    }

    fn action(&self, env: &mut TriggerEnv<'_>) -> Result<bool, TriggerError> {
        let Some(general) = env.general_mut() else {
            return Ok(true);
        };
        if general.crew <= 0 {
            return Ok(true);
        }

        let rice_needed = (general.crew / 100).max(1);
        if general.rice >= rice_needed {
            general.rice -= rice_needed;
        } else {
            general.rice = 0;
            let atmos_drop = Self::MAX_ATMOS_DROP.min(general.atmos.max(0));
            general.atmos -= atmos_drop;
            env.vars.insert("troopStarving".into(), AuxValue::Bool(true));
        }
        Ok(true)
    }
}

impl GeneralTrigger for TroopConsumptionTrigger {}

/// Triggers fired for every general before its reserved command runs.
pub fn build_pre_turn_triggers() -> Vec<Box<dyn GeneralTrigger>> {
    vec![
        Box::new(InjuryReductionTrigger),
        Box::new(TroopConsumptionTrigger),
    ]
}
