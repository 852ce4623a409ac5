//! Runs due turns against an in-memory working set.
//!
//! Each due tick visits every general in `(turn_time, id)` order, executes
//! its reserved command (or rests), fires the pre-turn triggers, then ages
//! nation cooldowns and advances the calendar by one month.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use warband_domain::{
    aux_map, AuxMap, DomainError, General, GeneralId, NationTurnKey, TurnDomainEvent, TurnResult,
    World, ACTION_REST,
};

use super::dirty_tracker::{DirtyTracker, EntityKind};
use super::error::TurnError;
use super::state::InMemoryWorldState;
use crate::infrastructure::ports::ClockPort;
use crate::trigger::{GeneralTrigger, ModifierRegistry, TriggerCaller, TriggerEnv};

/// The command a general executes this tick.
struct ResolvedCommand {
    action_code: String,
    arg: AuxMap,
}

impl ResolvedCommand {
    fn rest() -> Self {
        Self {
            action_code: ACTION_REST.to_string(),
            arg: AuxMap::new(),
        }
    }
}

/// Deterministic turn runner: given the same state, clock and triggers it
/// always produces the same result.
pub struct InMemoryTurnProcessor {
    clock: Arc<dyn ClockPort>,
    triggers: TriggerCaller<dyn GeneralTrigger>,
    modifiers: ModifierRegistry,
}

impl InMemoryTurnProcessor {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            clock,
            triggers: TriggerCaller::new(),
            modifiers: ModifierRegistry::builtin(),
        }
    }

    /// Replace the built-in modifier registry.
    pub fn with_modifiers(mut self, modifiers: ModifierRegistry) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Register triggers fired for every general each tick.
    pub fn with_triggers(
        mut self,
        triggers: impl IntoIterator<Item = Box<dyn GeneralTrigger>>,
    ) -> Self {
        self.triggers.add_all(triggers);
        self
    }

    pub fn triggers(&self) -> &TriggerCaller<dyn GeneralTrigger> {
        &self.triggers
    }

    /// Run every tick that is due at the current clock instant.
    ///
    /// Mutates `state` and `world` in place and records every mutation in
    /// `tracker`. Returns the number of ticks run and one `TURN_ADVANCED`
    /// event per tick.
    pub fn process(
        &self,
        state: &mut InMemoryWorldState,
        tracker: &mut DirtyTracker,
        world: &mut World,
    ) -> Result<TurnResult, TurnError> {
        if world.tick_seconds() == 0 {
            return Err(DomainError::validation("tick interval must be positive").into());
        }

        let now = self.clock.now();
        let mut advanced_turns = 0_u32;
        let mut events = Vec::new();

        while now >= world.next_turn_at() {
            self.run_generals(state, tracker, world, now)?;
            Self::age_nation_cooldowns(state, tracker);

            world.advance_month();
            world.set_updated_at(world.next_turn_at());
            advanced_turns += 1;
            events.push(TurnDomainEvent::turn_advanced(
                world.id(),
                world.current_year(),
                world.current_month(),
            ));
        }

        tracing::debug!(
            world_id = %world.id(),
            advanced_turns,
            year = world.current_year(),
            month = world.current_month(),
            "Processed world turns"
        );
        Ok(TurnResult::new(advanced_turns, events))
    }

    fn run_generals(
        &self,
        state: &mut InMemoryWorldState,
        tracker: &mut DirtyTracker,
        world: &World,
        now: DateTime<Utc>,
    ) -> Result<(), TurnError> {
        for general_id in state.generals_by_turn_time() {
            let Some(general) = state.generals.get(&general_id) else {
                continue;
            };

            if general.is_frozen() {
                if let Some(general) = state.generals.get_mut(&general_id) {
                    Self::count_down_frozen(general, now);
                }
                tracker.mark_dirty(EntityKind::General, general_id);
                continue;
            }

            let modifiers = self.modifiers.for_nation(state.nations.get(&general.nation_id));

            let nation_command = if general.issues_nation_commands() {
                let key = NationTurnKey {
                    nation_id: general.nation_id,
                    officer_level: general.officer_level,
                };
                let popped = state.pop_nation_turn(key);
                if popped.is_some() {
                    tracker.mark_dirty(EntityKind::NationQueue, key.nation_id);
                }
                popped.map(|turn| turn.action_code)
            } else {
                None
            };

            let command = Self::resolve_command(state, tracker, general_id);

            let Some(general) = state.generals.get_mut(&general_id) else {
                continue;
            };
            self.triggers.fire(&mut TriggerEnv::for_general(world, general))?;

            let cost_multiplier = modifiers.calc_domestic(
                &command.action_code,
                "cost",
                self.triggers
                    .calc_domestic(general, &command.action_code, "cost", 1.0, &command.arg),
            );
            let mut last_turn = aux_map! {
                "actionCode" => command.action_code,
                "arg" => command.arg,
                "costMultiplier" => cost_multiplier,
                // Marks a record written by this processor, rests included.
                "queuedInMemory" => true,
            };
            if let Some(code) = nation_command {
                last_turn.insert("nationActionCode".into(), code.into());
            }
            general.last_turn = last_turn;
            general.turn_time = now;
            general.updated_at = now;
            tracker.mark_dirty(EntityKind::General, general_id);
        }
        Ok(())
    }

    /// Pop the general's next command. AI generals discard their queue and rest.
    fn resolve_command(
        state: &mut InMemoryWorldState,
        tracker: &mut DirtyTracker,
        general_id: GeneralId,
    ) -> ResolvedCommand {
        let ai_controlled = state
            .generals
            .get(&general_id)
            .is_some_and(General::is_ai_controlled);

        if ai_controlled {
            if state.clear_general_queue(general_id) {
                tracker.mark_dirty(EntityKind::GeneralQueue, general_id);
            }
            return ResolvedCommand::rest();
        }

        match state.pop_general_turn(general_id) {
            Some(turn) => {
                tracker.mark_dirty(EntityKind::GeneralQueue, general_id);
                ResolvedCommand {
                    action_code: turn.action_code,
                    arg: turn.arg,
                }
            }
            None => ResolvedCommand::rest(),
        }
    }

    /// Frozen generals only serve out their remaining turns.
    fn count_down_frozen(general: &mut General, now: DateTime<Utc>) {
        if let Some(kill_turn) = general.kill_turn {
            let remaining = kill_turn - 1;
            if remaining <= 0 {
                tracing::debug!(general_id = %general.id, "Frozen general left service");
                general.leave_service();
            } else {
                general.kill_turn = Some(remaining);
            }
        }
        general.turn_time = now;
        general.updated_at = now;
    }

    fn age_nation_cooldowns(state: &mut InMemoryWorldState, tracker: &mut DirtyTracker) {
        for nation in state.nations.values_mut() {
            if nation.strategic_cmd_limit > 0 {
                nation.strategic_cmd_limit -= 1;
                tracker.mark_dirty(EntityKind::Nation, nation.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClockPort, WorldRecords};
    use crate::trigger::{
        build_pre_turn_triggers, ObjectTrigger, TriggerError, TriggerPriority,
    };
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeSet;
    use warband_domain::{
        AuxMapExt, AuxValue, GeneralTurn, Nation, NationId, NationTurn, WorldId,
        NPC_STATE_WANDERER,
    };

    const TICK_SECONDS: u32 = 600;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn clock_at(now: DateTime<Utc>) -> Arc<dyn ClockPort> {
        let mut clock = MockClockPort::new();
        clock.expect_now().return_const(now);
        Arc::new(clock)
    }

    fn world() -> World {
        World::new(WorldId::new(1), 184, 1, TICK_SECONDS, t0()).unwrap()
    }

    fn general(id: i64) -> General {
        General::new(GeneralId::new(id), WorldId::new(1), format!("General {id}"), t0())
    }

    fn state(records: WorldRecords) -> InMemoryWorldState {
        InMemoryWorldState::from_records(WorldId::new(1), records)
    }

    fn one_tick() -> DateTime<Utc> {
        t0() + Duration::seconds(i64::from(TICK_SECONDS))
    }

    struct Failing;

    impl ObjectTrigger for Failing {
        fn unique_id(&self) -> &str {
            "failing"
        }
        fn priority(&self) -> i32 {
            TriggerPriority::BODY
        }
        fn action(&self, _env: &mut TriggerEnv<'_>) -> Result<bool, TriggerError> {
            Err(TriggerError::action("failing", "scripted failure"))
        }
    }

    impl GeneralTrigger for Failing {}

    struct CheapFarming;

    impl ObjectTrigger for CheapFarming {
        fn unique_id(&self) -> &str {
            "cheap_farming"
        }
        fn priority(&self) -> i32 {
            TriggerPriority::PRE
        }
        fn action(&self, _env: &mut TriggerEnv<'_>) -> Result<bool, TriggerError> {
            Ok(true)
        }
    }

    impl GeneralTrigger for CheapFarming {
        fn on_calc_domestic(
            &self,
            _general: &General,
            command_key: &str,
            var_key: &str,
            value: f64,
            _aux: &AuxMap,
        ) -> f64 {
            if command_key == "farm" && var_key == "cost" {
                value * 0.8
            } else {
                value
            }
        }
    }

    #[test]
    fn nothing_due_leaves_state_untouched() {
        let processor = InMemoryTurnProcessor::new(clock_at(t0() + Duration::seconds(599)));
        let mut world = world();
        let mut state = state(WorldRecords {
            generals: vec![general(1)],
            ..WorldRecords::default()
        });
        let before = state.clone();
        let mut tracker = DirtyTracker::new();

        let result = processor.process(&mut state, &mut tracker, &mut world).unwrap();

        assert!(result.is_empty());
        assert!(tracker.is_clean());
        assert_eq!(state, before);
        assert_eq!(world.current_month(), 1);
    }

    #[test]
    fn due_tick_runs_queued_command_and_advances_calendar() {
        let processor = InMemoryTurnProcessor::new(clock_at(one_tick()));
        let mut world = world();
        let mut state = state(WorldRecords {
            generals: vec![general(1), general(2)],
            general_turns: vec![
                GeneralTurn::new(GeneralId::new(1), 0, "farm"),
                GeneralTurn::new(GeneralId::new(1), 1, "train"),
            ],
            ..WorldRecords::default()
        });
        let mut tracker = DirtyTracker::new();

        let result = processor.process(&mut state, &mut tracker, &mut world).unwrap();

        assert_eq!(result.advanced_turns, 1);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].calendar(), Some((184, 2)));
        assert_eq!(world.updated_at(), one_tick());

        let farmer = &state.generals[&GeneralId::new(1)];
        assert_eq!(farmer.last_turn.get_str("actionCode"), Some("farm"));
        assert_eq!(farmer.last_turn.get_bool("queuedInMemory"), Some(true));
        assert_eq!(farmer.turn_time, one_tick());
        let idle = &state.generals[&GeneralId::new(2)];
        assert_eq!(idle.last_turn.get_str("actionCode"), Some(ACTION_REST));
        assert_eq!(idle.last_turn.get_bool("queuedInMemory"), Some(true));

        assert_eq!(state.general_queue(GeneralId::new(1)).len(), 1);
        assert_eq!(
            tracker.dirty_ids(EntityKind::General),
            BTreeSet::from([1, 2])
        );
        assert_eq!(
            tracker.dirty_ids(EntityKind::GeneralQueue),
            BTreeSet::from([1])
        );
    }

    #[test]
    fn catches_up_every_missed_tick() {
        let now = t0() + Duration::seconds(i64::from(TICK_SECONDS) * 12);
        let processor = InMemoryTurnProcessor::new(clock_at(now));
        let mut world = world();
        let mut state = state(WorldRecords::default());
        let mut tracker = DirtyTracker::new();

        let result = processor.process(&mut state, &mut tracker, &mut world).unwrap();

        assert_eq!(result.advanced_turns, 12);
        assert_eq!(result.events.last().and_then(|e| e.calendar()), Some((185, 1)));
        assert_eq!((world.current_year(), world.current_month()), (185, 1));
        assert_eq!(world.updated_at(), now);
    }

    #[test]
    fn frozen_general_counts_down_then_leaves_service() {
        let processor = InMemoryTurnProcessor::new(clock_at(one_tick()));
        let mut world = world();
        let mut frozen = general(1);
        frozen.block_state = 2;
        frozen.kill_turn = Some(1);
        frozen.nation_id = NationId::new(3);
        frozen.officer_level = 6;
        frozen.injury = 4;
        let mut patient = general(2);
        patient.block_state = 3;
        patient.kill_turn = Some(5);
        let mut state = state(WorldRecords {
            generals: vec![frozen, patient],
            general_turns: vec![GeneralTurn::new(GeneralId::new(1), 0, "farm")],
            ..WorldRecords::default()
        });
        let mut tracker = DirtyTracker::new();

        processor
            .with_triggers(build_pre_turn_triggers())
            .process(&mut state, &mut tracker, &mut world)
            .unwrap();

        let left = &state.generals[&GeneralId::new(1)];
        assert_eq!(left.npc_state, NPC_STATE_WANDERER);
        assert!(left.nation_id.is_none());
        assert_eq!(left.officer_level, 6);
        assert!(!left.issues_nation_commands());
        assert_eq!(left.kill_turn, None);
        // Frozen generals skip triggers and keep their queue.
        assert_eq!(left.injury, 4);
        assert_eq!(state.general_queue(GeneralId::new(1)).len(), 1);
        assert_eq!(state.generals[&GeneralId::new(2)].kill_turn, Some(4));
        assert!(tracker.dirty_ids(EntityKind::GeneralQueue).is_empty());
        assert_eq!(tracker.dirty_ids(EntityKind::General), BTreeSet::from([1, 2]));
    }

    #[test]
    fn ai_general_discards_queue_and_rests() {
        let processor = InMemoryTurnProcessor::new(clock_at(one_tick()));
        let mut world = world();
        let mut npc = general(1);
        npc.npc_state = 2;
        let mut state = state(WorldRecords {
            generals: vec![npc],
            general_turns: vec![
                GeneralTurn::new(GeneralId::new(1), 0, "farm"),
                GeneralTurn::new(GeneralId::new(1), 1, "draft"),
            ],
            ..WorldRecords::default()
        });
        let mut tracker = DirtyTracker::new();

        processor.process(&mut state, &mut tracker, &mut world).unwrap();

        let npc = &state.generals[&GeneralId::new(1)];
        assert_eq!(npc.last_turn.get_str("actionCode"), Some(ACTION_REST));
        assert!(state.general_queue(GeneralId::new(1)).is_empty());
        assert_eq!(tracker.dirty_ids(EntityKind::GeneralQueue), BTreeSet::from([1]));
    }

    #[test]
    fn chief_pops_nation_queue_and_cooldowns_age() {
        let processor = InMemoryTurnProcessor::new(clock_at(one_tick()));
        let mut world = world();
        let mut chief = general(1);
        chief.nation_id = NationId::new(7);
        chief.officer_level = 12;
        let mut nation = Nation::new(NationId::new(7), WorldId::new(1), "Shu");
        nation.strategic_cmd_limit = 2;
        let idle_nation = Nation::new(NationId::new(8), WorldId::new(1), "Wu");
        let mut state = state(WorldRecords {
            generals: vec![chief],
            nations: vec![nation, idle_nation],
            nation_turns: vec![
                NationTurn::new(NationId::new(7), 12, 0, "reward"),
                NationTurn::new(NationId::new(7), 12, 1, "declare_war"),
            ],
            ..WorldRecords::default()
        });
        let mut tracker = DirtyTracker::new();

        processor.process(&mut state, &mut tracker, &mut world).unwrap();

        let chief = &state.generals[&GeneralId::new(1)];
        assert_eq!(chief.last_turn.get_str("nationActionCode"), Some("reward"));
        assert_eq!(state.nation_queue(NationId::new(7)).len(), 1);
        assert_eq!(tracker.dirty_ids(EntityKind::NationQueue), BTreeSet::from([7]));

        assert_eq!(state.nations[&NationId::new(7)].strategic_cmd_limit, 1);
        assert_eq!(state.nations[&NationId::new(8)].strategic_cmd_limit, 0);
        assert_eq!(tracker.dirty_ids(EntityKind::Nation), BTreeSet::from([7]));
    }

    #[test]
    fn pre_turn_triggers_mutate_generals() {
        let processor = InMemoryTurnProcessor::new(clock_at(one_tick()))
            .with_triggers(build_pre_turn_triggers());
        let mut world = world();
        let mut wounded = general(1);
        wounded.injury = 2;
        wounded.crew = 500;
        wounded.rice = 10;
        let mut state = state(WorldRecords {
            generals: vec![wounded],
            ..WorldRecords::default()
        });
        let mut tracker = DirtyTracker::new();

        processor.process(&mut state, &mut tracker, &mut world).unwrap();

        let g = &state.generals[&GeneralId::new(1)];
        assert_eq!(g.injury, 1);
        assert_eq!(g.rice, 5);
    }

    #[test]
    fn cost_multiplier_comes_from_trigger_hooks() {
        let processor =
            InMemoryTurnProcessor::new(clock_at(one_tick())).with_triggers([
                Box::new(CheapFarming) as Box<dyn GeneralTrigger>
            ]);
        let mut world = world();
        let mut state = state(WorldRecords {
            generals: vec![general(1), general(2)],
            general_turns: vec![
                GeneralTurn::new(GeneralId::new(1), 0, "farm")
                    .with_arg(aux_map! { "amount" => 3_i64 }),
            ],
            ..WorldRecords::default()
        });
        let mut tracker = DirtyTracker::new();

        processor.process(&mut state, &mut tracker, &mut world).unwrap();

        let farmer = &state.generals[&GeneralId::new(1)].last_turn;
        assert_eq!(farmer.get_float("costMultiplier"), Some(0.8));
        assert_eq!(
            farmer.get("arg").and_then(AuxValue::as_map).and_then(|m| m.get_int("amount")),
            Some(3)
        );
        let rester = &state.generals[&GeneralId::new(2)].last_turn;
        assert_eq!(rester.get_float("costMultiplier"), Some(1.0));
    }

    #[test]
    fn nation_type_scales_cost_after_triggers() {
        let processor =
            InMemoryTurnProcessor::new(clock_at(one_tick())).with_triggers([
                Box::new(CheapFarming) as Box<dyn GeneralTrigger>
            ]);
        let mut world = world();
        let mut rebels = Nation::new(NationId::new(3), WorldId::new(1), "Yellow Sky");
        rebels.type_code = "che_황건".into();
        let mut farmer = general(1);
        farmer.nation_id = NationId::new(3);
        let mut trainer = general(2);
        trainer.nation_id = NationId::new(3);
        let mut state = state(WorldRecords {
            generals: vec![farmer, trainer, general(3)],
            nations: vec![rebels],
            general_turns: vec![
                GeneralTurn::new(GeneralId::new(1), 0, "farm"),
                GeneralTurn::new(GeneralId::new(2), 0, "train"),
                GeneralTurn::new(GeneralId::new(3), 0, "farm"),
            ],
            ..WorldRecords::default()
        });
        let mut tracker = DirtyTracker::new();

        processor.process(&mut state, &mut tracker, &mut world).unwrap();

        let cost = |id: i64| {
            state.generals[&GeneralId::new(id)]
                .last_turn
                .get_float("costMultiplier")
                .unwrap()
        };
        assert!((cost(1) - 0.64).abs() < 1e-9);
        assert!((cost(2) - 0.8).abs() < 1e-9);
        // General 3 serves no nation.
        assert!((cost(3) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn empty_registry_leaves_costs_to_triggers() {
        let processor =
            InMemoryTurnProcessor::new(clock_at(one_tick())).with_modifiers(ModifierRegistry::new());
        let mut world = world();
        let mut rebels = Nation::new(NationId::new(3), WorldId::new(1), "Yellow Sky");
        rebels.type_code = "che_황건".into();
        let mut trainer = general(1);
        trainer.nation_id = NationId::new(3);
        let mut state = state(WorldRecords {
            generals: vec![trainer],
            nations: vec![rebels],
            general_turns: vec![GeneralTurn::new(GeneralId::new(1), 0, "train")],
            ..WorldRecords::default()
        });
        let mut tracker = DirtyTracker::new();

        processor.process(&mut state, &mut tracker, &mut world).unwrap();

        let last_turn = &state.generals[&GeneralId::new(1)].last_turn;
        assert_eq!(last_turn.get_float("costMultiplier"), Some(1.0));
    }

    #[test]
    fn trigger_failure_aborts_the_pass() {
        let processor = InMemoryTurnProcessor::new(clock_at(one_tick()))
            .with_triggers([Box::new(Failing) as Box<dyn GeneralTrigger>]);
        let mut world = world();
        let mut state = state(WorldRecords {
            generals: vec![general(1)],
            ..WorldRecords::default()
        });
        let mut tracker = DirtyTracker::new();

        let err = processor
            .process(&mut state, &mut tracker, &mut world)
            .unwrap_err();

        assert!(matches!(err, TurnError::Trigger(_)));
        assert_eq!(world.current_month(), 1);
    }

    #[test]
    fn zero_tick_is_rejected() {
        let json = format!(
            r#"{{"id":1,"currentYear":184,"currentMonth":1,"tickSeconds":0,
                "realtimeMode":false,"config":{{}},"meta":{{}},"updatedAt":"{}"}}"#,
            t0().to_rfc3339()
        );
        let mut world: World = serde_json::from_str(&json).unwrap();
        let processor = InMemoryTurnProcessor::new(clock_at(one_tick()));

        let err = processor
            .process(&mut state(WorldRecords::default()), &mut DirtyTracker::new(), &mut world)
            .unwrap_err();

        assert!(matches!(err, TurnError::Domain(DomainError::Validation(_))));
    }
}
