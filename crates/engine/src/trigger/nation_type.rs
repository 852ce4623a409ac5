//! Built-in nation types.
//!
//! Every nation carries one type code. The type scales domestic commands
//! (score, cost and success) and battle stats for every general serving it.
//! Effects on income and strategic delays belong to calculations this engine
//! does not run and are left out.

use super::modifier::{ActionModifier, DomesticContext, StatContext};

/// Domestic command codes a nation type can single out.
pub mod action {
    pub const FARM: &str = "farm";
    pub const COMMERCE: &str = "commerce";
    pub const TECH: &str = "tech";
    pub const DEFENSE: &str = "defense";
    pub const WALL: &str = "wall";
    pub const SECURITY: &str = "security";
    pub const TRUST: &str = "trust";
    pub const SETTLE: &str = "settle";
    pub const SCHEME: &str = "scheme";
}

use action::*;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DomesticEffect {
    score: f64,
    cost: f64,
    success: f64,
    success_bonus: f64,
}

impl DomesticEffect {
    const NONE: Self = Self {
        score: 1.0,
        cost: 1.0,
        success: 1.0,
        success_bonus: 0.0,
    };
    const BOOST: Self = Self {
        score: 1.1,
        cost: 0.8,
        ..Self::NONE
    };
    const PENALTY: Self = Self {
        score: 0.9,
        cost: 1.2,
        ..Self::NONE
    };

    const fn score(score: f64) -> Self {
        Self {
            score,
            ..Self::NONE
        }
    }

    fn apply(self, mut ctx: DomesticContext) -> DomesticContext {
        ctx.score_multiplier *= self.score;
        ctx.cost_multiplier *= self.cost;
        ctx.success_multiplier = ctx.success_multiplier * self.success + self.success_bonus;
        ctx
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StatEffect {
    war_power: f64,
    critical: f64,
    dodge: f64,
    magic: f64,
    intel: f64,
    strength: f64,
}

impl StatEffect {
    const NONE: Self = Self {
        war_power: 1.0,
        critical: 0.0,
        dodge: 0.0,
        magic: 0.0,
        intel: 0.0,
        strength: 0.0,
    };

    const fn war_power(war_power: f64) -> Self {
        Self {
            war_power,
            ..Self::NONE
        }
    }

    fn apply(self, mut stat: StatContext) -> StatContext {
        stat.war_power *= self.war_power;
        stat.critical_chance += self.critical;
        stat.dodge_chance += self.dodge;
        stat.magic_chance += self.magic;
        stat.intel += self.intel;
        stat.strength += self.strength;
        stat
    }
}

type ActionRule = (&'static [&'static str], DomesticEffect);

/// One nation type: a flat domestic effect, per-command effects (first
/// matching rule wins) and a stat effect.
#[derive(Debug, Clone, Copy)]
pub struct NationType {
    code: &'static str,
    name: &'static str,
    domestic: DomesticEffect,
    by_action: &'static [ActionRule],
    stat: StatEffect,
}

impl NationType {
    const fn plain(code: &'static str, name: &'static str) -> Self {
        Self {
            code,
            name,
            domestic: DomesticEffect::NONE,
            by_action: &[],
            stat: StatEffect::NONE,
        }
    }

    const fn domestic(mut self, effect: DomesticEffect) -> Self {
        self.domestic = effect;
        self
    }

    const fn by_action(mut self, rules: &'static [ActionRule]) -> Self {
        self.by_action = rules;
        self
    }

    const fn stat(mut self, effect: StatEffect) -> Self {
        self.stat = effect;
        self
    }
}

impl ActionModifier for NationType {
    fn code(&self) -> &str {
        self.code
    }

    fn name(&self) -> &str {
        self.name
    }

    fn on_calc_domestic(&self, ctx: DomesticContext) -> DomesticContext {
        let ctx = self.domestic.apply(ctx);
        let rule = self
            .by_action
            .iter()
            .find(|(codes, _)| codes.contains(&ctx.action_code.as_str()));
        match rule {
            Some((_, effect)) => effect.apply(ctx),
            None => ctx,
        }
    }

    fn on_calc_stat(&self, stat: StatContext) -> StatContext {
        self.stat.apply(stat)
    }
}

const BOOST: DomesticEffect = DomesticEffect::BOOST;
const PENALTY: DomesticEffect = DomesticEffect::PENALTY;

pub static NATION_TYPES: &[NationType] = &[
    NationType::plain("che_중립", "Neutral"),
    NationType::plain("che_군벌", "Warlord").stat(StatEffect::war_power(1.05)),
    NationType::plain("che_왕도", "Kingly Way").domestic(DomesticEffect::score(1.15)),
    NationType::plain("che_패도", "Hegemon")
        .domestic(DomesticEffect::score(0.95))
        .stat(StatEffect::war_power(1.1)),
    NationType::plain("che_상인", "Merchant"),
    NationType::plain("che_농업국", "Agrarian"),
    NationType::plain("che_유목", "Nomad").stat(StatEffect {
        dodge: 0.03,
        ..StatEffect::war_power(1.08)
    }),
    NationType::plain("che_해적", "Pirate").stat(StatEffect {
        critical: 0.05,
        ..StatEffect::war_power(1.05)
    }),
    NationType::plain("che_황건", "Yellow Turban")
        .domestic(DomesticEffect {
            cost: 0.8,
            ..DomesticEffect::NONE
        })
        .stat(StatEffect {
            magic: 0.1,
            ..StatEffect::NONE
        }),
    NationType::plain("che_종교", "Religious").domestic(DomesticEffect {
        success: 1.1,
        ..DomesticEffect::NONE
    }),
    NationType::plain("che_학문", "Scholarly")
        .domestic(DomesticEffect::score(1.1))
        .stat(StatEffect {
            intel: 3.0,
            ..StatEffect::NONE
        }),
    NationType::plain("che_명문", "Noble House")
        .domestic(DomesticEffect {
            score: 1.05,
            success: 1.05,
            ..DomesticEffect::NONE
        })
        .stat(StatEffect::war_power(1.03)),
    NationType::plain("che_의적", "Righteous Outlaw")
        .domestic(DomesticEffect::score(1.05))
        .stat(StatEffect {
            critical: 0.03,
            ..StatEffect::NONE
        }),
    NationType::plain("che_은둔", "Hermit").stat(StatEffect {
        dodge: 0.05,
        ..StatEffect::NONE
    }),
    NationType::plain("che_무사", "Warrior").stat(StatEffect {
        strength: 3.0,
        ..StatEffect::war_power(1.05)
    }),
    NationType::plain("che_건국", "Founding").domestic(DomesticEffect::score(1.1)),
    NationType::plain("che_도적", "Bandit").by_action(&[
        (&[SECURITY, TRUST, SETTLE], PENALTY),
        (
            &[SCHEME],
            DomesticEffect {
                success_bonus: 0.1,
                ..DomesticEffect::NONE
            },
        ),
    ]),
    NationType::plain("che_명가", "School of Names").by_action(&[
        (&[TECH], BOOST),
        (&[DEFENSE, WALL], PENALTY),
    ]),
    NationType::plain("che_음양가", "Yin-Yang").by_action(&[
        (&[FARM, COMMERCE], BOOST),
        (&[TECH], PENALTY),
    ]),
    NationType::plain("che_종횡가", "Diplomatist").by_action(&[
        (&[DEFENSE, WALL], BOOST),
        (&[FARM, COMMERCE], PENALTY),
    ]),
    NationType::plain("che_불가", "Buddhist")
        .by_action(&[(&[TRUST, SETTLE, DEFENSE, WALL], BOOST)]),
    NationType::plain("che_오두미도", "Five Pecks of Rice")
        .by_action(&[(&[TECH, DEFENSE, WALL, FARM, COMMERCE], PENALTY)]),
    NationType::plain("che_태평도", "Great Peace").by_action(&[
        (&[TRUST, SETTLE], BOOST),
        (&[TECH, DEFENSE, WALL], PENALTY),
    ]),
    NationType::plain("che_도가", "Taoist").by_action(&[(&[TECH, SECURITY], PENALTY)]),
    NationType::plain("che_묵가", "Mohist").by_action(&[
        (&[DEFENSE, WALL], BOOST),
        (&[TECH], PENALTY),
    ]),
    NationType::plain("che_덕가", "Virtue").by_action(&[
        (&[SECURITY, TRUST, SETTLE], BOOST),
        (&[DEFENSE, WALL], PENALTY),
    ]),
    NationType::plain("che_병가", "Strategist").by_action(&[
        (&[TECH, DEFENSE, WALL], BOOST),
        (&[TRUST, SETTLE], PENALTY),
    ]),
    NationType::plain("che_유가", "Confucian")
        .by_action(&[(&[FARM, COMMERCE, TRUST, SETTLE], BOOST)]),
    NationType::plain("che_법가", "Legalist").by_action(&[
        (&[SECURITY], BOOST),
        (&[TRUST, SETTLE], PENALTY),
    ]),
];
