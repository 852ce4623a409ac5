//! Action modifiers: nation-type effects expressed as folds over
//! calculation contexts.
//!
//! The processor asks a [`ModifierRegistry`] for the [`ModifierSet`] that
//! applies to a general, then folds string-keyed calculations through it
//! after the trigger chain has had its say.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use warband_domain::Nation;

use super::nation_type::NATION_TYPES;

/// A named effect that adjusts domestic or stat calculations.
pub trait ActionModifier: Send + Sync {
    fn code(&self) -> &str;

    fn name(&self) -> &str;

    fn on_calc_domestic(&self, ctx: DomesticContext) -> DomesticContext {
        ctx
    }

    fn on_calc_stat(&self, stat: StatContext) -> StatContext {
        stat
    }
}

/// Multipliers consulted by domestic commands.
#[derive(Debug, Clone, PartialEq)]
pub struct DomesticContext {
    pub action_code: String,
    pub cost_multiplier: f64,
    pub success_multiplier: f64,
    pub fail_multiplier: f64,
    pub score_multiplier: f64,
    pub train_multiplier: f64,
    pub atmos_multiplier: f64,
}

impl DomesticContext {
    pub fn new(action_code: impl Into<String>) -> Self {
        Self {
            action_code: action_code.into(),
            cost_multiplier: 1.0,
            success_multiplier: 1.0,
            fail_multiplier: 1.0,
            score_multiplier: 1.0,
            train_multiplier: 1.0,
            atmos_multiplier: 1.0,
        }
    }
}

/// Which [`DomesticContext`] field a hook call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomesticVar {
    Cost,
    Success,
    Fail,
    Score,
    Train,
    Atmos,
}

impl DomesticVar {
    pub fn get(self, ctx: &DomesticContext) -> f64 {
        match self {
            Self::Cost => ctx.cost_multiplier,
            Self::Success => ctx.success_multiplier,
            Self::Fail => ctx.fail_multiplier,
            Self::Score => ctx.score_multiplier,
            Self::Train => ctx.train_multiplier,
            Self::Atmos => ctx.atmos_multiplier,
        }
    }

    pub fn set(self, ctx: &mut DomesticContext, value: f64) {
        let slot = match self {
            Self::Cost => &mut ctx.cost_multiplier,
            Self::Success => &mut ctx.success_multiplier,
            Self::Fail => &mut ctx.fail_multiplier,
            Self::Score => &mut ctx.score_multiplier,
            Self::Train => &mut ctx.train_multiplier,
            Self::Atmos => &mut ctx.atmos_multiplier,
        };
        *slot = value;
    }
}

impl FromStr for DomesticVar {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cost" => Ok(Self::Cost),
            "success" => Ok(Self::Success),
            "fail" => Ok(Self::Fail),
            "score" => Ok(Self::Score),
            "train" => Ok(Self::Train),
            "atmos" => Ok(Self::Atmos),
            _ => Err(()),
        }
    }
}

/// Stats and battle probabilities consulted by stat calculations.
#[derive(Debug, Clone, PartialEq)]
pub struct StatContext {
    pub leadership: f64,
    pub strength: f64,
    pub intel: f64,
    pub critical_chance: f64,
    pub dodge_chance: f64,
    pub magic_chance: f64,
    pub war_power: f64,
    pub bonus_train: f64,
    pub bonus_atmos: f64,
    pub dex_multiplier: f64,
    pub exp_multiplier: f64,
    pub injury_prob: f64,
    pub dedication_multiplier: f64,
}

impl Default for StatContext {
    fn default() -> Self {
        Self {
            leadership: 0.0,
            strength: 0.0,
            intel: 0.0,
            critical_chance: 0.05,
            dodge_chance: 0.05,
            magic_chance: 0.0,
            war_power: 1.0,
            bonus_train: 0.0,
            bonus_atmos: 0.0,
            dex_multiplier: 1.0,
            exp_multiplier: 1.0,
            injury_prob: 0.0,
            dedication_multiplier: 1.0,
        }
    }
}

/// Which [`StatContext`] field a hook call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatVar {
    Leadership,
    Strength,
    Intel,
    CriticalChance,
    DodgeChance,
    MagicChance,
    WarPower,
    BonusTrain,
    BonusAtmos,
    DexMultiplier,
    ExpMultiplier,
    InjuryProb,
    DedicationMultiplier,
}

impl StatVar {
    fn slot(self, stat: &mut StatContext) -> &mut f64 {
        match self {
            Self::Leadership => &mut stat.leadership,
            Self::Strength => &mut stat.strength,
            Self::Intel => &mut stat.intel,
            Self::CriticalChance => &mut stat.critical_chance,
            Self::DodgeChance => &mut stat.dodge_chance,
            Self::MagicChance => &mut stat.magic_chance,
            Self::WarPower => &mut stat.war_power,
            Self::BonusTrain => &mut stat.bonus_train,
            Self::BonusAtmos => &mut stat.bonus_atmos,
            Self::DexMultiplier => &mut stat.dex_multiplier,
            Self::ExpMultiplier => &mut stat.exp_multiplier,
            Self::InjuryProb => &mut stat.injury_prob,
            Self::DedicationMultiplier => &mut stat.dedication_multiplier,
        }
    }

    pub fn get(self, stat: &StatContext) -> f64 {
        match self {
            Self::Leadership => stat.leadership,
            Self::Strength => stat.strength,
            Self::Intel => stat.intel,
            Self::CriticalChance => stat.critical_chance,
            Self::DodgeChance => stat.dodge_chance,
            Self::MagicChance => stat.magic_chance,
            Self::WarPower => stat.war_power,
            Self::BonusTrain => stat.bonus_train,
            Self::BonusAtmos => stat.bonus_atmos,
            Self::DexMultiplier => stat.dex_multiplier,
            Self::ExpMultiplier => stat.exp_multiplier,
            Self::InjuryProb => stat.injury_prob,
            Self::DedicationMultiplier => stat.dedication_multiplier,
        }
    }

    pub fn set(self, stat: &mut StatContext, value: f64) {
        *self.slot(stat) = value;
    }
}

impl FromStr for StatVar {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leadership" => Ok(Self::Leadership),
            "strength" => Ok(Self::Strength),
            "intel" => Ok(Self::Intel),
            "criticalChance" => Ok(Self::CriticalChance),
            "dodgeChance" => Ok(Self::DodgeChance),
            "magicChance" => Ok(Self::MagicChance),
            "warPower" => Ok(Self::WarPower),
            "bonusTrain" => Ok(Self::BonusTrain),
            "bonusAtmos" => Ok(Self::BonusAtmos),
            "dexMultiplier" => Ok(Self::DexMultiplier),
            "expMultiplier" => Ok(Self::ExpMultiplier),
            "injuryProb" => Ok(Self::InjuryProb),
            "dedicationMultiplier" => Ok(Self::DedicationMultiplier),
            _ => Err(()),
        }
    }
}

/// Modifiers that apply to one general, in application order.
#[derive(Clone, Default)]
pub struct ModifierSet {
    modifiers: Vec<Arc<dyn ActionModifier>>,
}

impl ModifierSet {
    pub fn new(modifiers: Vec<Arc<dyn ActionModifier>>) -> Self {
        Self { modifiers }
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.modifiers.iter().map(|m| m.code()).collect()
    }

    /// Fold `value` through every modifier's domestic hook.
    ///
    /// Keys that do not name a [`DomesticContext`] field return `value`.
    pub fn calc_domestic(&self, action_code: &str, var_key: &str, value: f64) -> f64 {
        let Ok(var) = var_key.parse::<DomesticVar>() else {
            return value;
        };
        let mut ctx = DomesticContext::new(action_code);
        var.set(&mut ctx, value);
        let modified = self
            .modifiers
            .iter()
            .fold(ctx, |ctx, modifier| modifier.on_calc_domestic(ctx));
        var.get(&modified)
    }

    /// Fold `value` through every modifier's stat hook.
    pub fn calc_stat(&self, stat_key: &str, value: f64) -> f64 {
        let Ok(var) = stat_key.parse::<StatVar>() else {
            return value;
        };
        let mut stat = StatContext::default();
        var.set(&mut stat, value);
        let modified = self
            .modifiers
            .iter()
            .fold(stat, |stat, modifier| modifier.on_calc_stat(stat));
        var.get(&modified)
    }
}

impl FromIterator<Arc<dyn ActionModifier>> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn ActionModifier>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Modifier lookup by code.
#[derive(Clone, Default)]
pub struct ModifierRegistry {
    nation_types: BTreeMap<String, Arc<dyn ActionModifier>>,
}

impl ModifierRegistry {
    /// An empty registry; every selection is empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in nation type.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for nation_type in NATION_TYPES {
            registry.register_nation_type(Arc::new(*nation_type));
        }
        registry
    }

    /// Register or replace the modifier for `modifier.code()`.
    pub fn register_nation_type(&mut self, modifier: Arc<dyn ActionModifier>) {
        self.nation_types
            .insert(modifier.code().to_string(), modifier);
    }

    pub fn nation_type(&self, code: &str) -> Option<&Arc<dyn ActionModifier>> {
        self.nation_types.get(code)
    }

    /// Modifiers for a general serving `nation`. Wanderers get none, and so
    /// does a nation whose type code is unknown.
    pub fn for_nation(&self, nation: Option<&Nation>) -> ModifierSet {
        nation
            .and_then(|n| self.nation_type(&n.type_code))
            .cloned()
            .into_iter()
            .collect()
    }
}
