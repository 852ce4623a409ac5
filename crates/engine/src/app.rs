//! Application state and composition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use warband_domain::{
    aux_map, City, CityId, General, GeneralId, GeneralTurn, Nation, NationId, NationTurn, World,
    WorldId, META_COMMIT_SHA, META_GATEWAY_ACTIVE,
};

use crate::infrastructure::{
    event_bus::BroadcastGameEvents,
    ports::{ClockPort, PersistBatch, RepoError, WorldRepo, WorldStateRepo},
    settings::EngineSettings,
};
use crate::trigger::build_pre_turn_triggers;
use crate::use_cases::turn::{
    InMemoryTurnProcessor, TurnCoordinator, TurnDaemon, TurnStatusService, TurnUseCases,
    WorldStateLoader, WorldStatePersister,
};

/// Main application state.
///
/// Holds the storage ports, the turn use cases and the event bus.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub events: Arc<BroadcastGameEvents>,
    pub clock: Arc<dyn ClockPort>,
    pub settings: EngineSettings,
}

/// Container for the storage ports.
pub struct Repositories {
    pub world: Arc<dyn WorldRepo>,
    pub world_state: Arc<dyn WorldStateRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub turn: TurnUseCases,
}

impl App {
    pub fn new(
        world: Arc<dyn WorldRepo>,
        world_state: Arc<dyn WorldStateRepo>,
        clock: Arc<dyn ClockPort>,
        settings: EngineSettings,
    ) -> Self {
        let events = Arc::new(BroadcastGameEvents::new());
        let status = Arc::new(TurnStatusService::new());

        let processor = InMemoryTurnProcessor::new(clock.clone())
            .with_triggers(build_pre_turn_triggers());
        let coordinator = Arc::new(TurnCoordinator::new(
            WorldStateLoader::new(world.clone(), world_state.clone()),
            processor,
            WorldStatePersister::new(world_state.clone()),
            events.clone(),
            status.clone(),
        ));
        let daemon = Arc::new(TurnDaemon::new(
            world.clone(),
            coordinator.clone(),
            settings.commit_sha.clone(),
        ));

        Self {
            repositories: Repositories { world, world_state },
            use_cases: UseCases {
                turn: TurnUseCases::new(coordinator, daemon, status),
            },
            events,
            clock,
            settings,
        }
    }

    /// Seed a small demo world when storage holds no worlds.
    ///
    /// Returns whether anything was written.
    pub async fn seed_demo_world(&self) -> Result<bool, RepoError> {
        if !self.repositories.world.list().await?.is_empty() {
            return Ok(false);
        }

        let tick_seconds = u32::try_from(self.settings.turn_interval.as_secs())
            .unwrap_or(u32::MAX)
            .max(1);
        let (world, batch) = demo_world(self.clock.now(), tick_seconds, &self.settings.commit_sha)
            .map_err(|e| RepoError::database("seed_demo_world", e))?;

        self.repositories.world_state.commit(&world, &batch).await?;
        tracing::info!(
            world_id = %world.id(),
            generals = batch.generals.len(),
            nations = batch.nations.len(),
            "Seeded demo world"
        );
        Ok(true)
    }
}

/// Two nations, two cities and four generals covering each turn path:
/// a chief, an officer with queued orders, an AI general and a frozen one.
fn demo_world(
    now: DateTime<Utc>,
    tick_seconds: u32,
    commit_sha: &str,
) -> Result<(World, PersistBatch), warband_domain::DomainError> {
    let world_id = WorldId::new(1);
    let world = World::new(world_id, 184, 1, tick_seconds, now)?.with_meta(aux_map! {
        META_COMMIT_SHA => commit_sha,
        META_GATEWAY_ACTIVE => true,
    });

    let shu = NationId::new(1);
    let wei = NationId::new(2);

    let mut chengdu = City::new(CityId::new(1), world_id, "Chengdu");
    chengdu.nation_id = shu;
    let mut xuchang = City::new(CityId::new(2), world_id, "Xuchang");
    xuchang.nation_id = wei;

    let mut shu_nation = Nation::new(shu, world_id, "Shu");
    shu_nation.type_code = "che_유가".into();
    shu_nation.capital_city_id = Some(chengdu.id);
    shu_nation.chief_general_id = Some(GeneralId::new(1));
    shu_nation.strategic_cmd_limit = 3;
    let mut wei_nation = Nation::new(wei, world_id, "Wei");
    wei_nation.capital_city_id = Some(xuchang.id);

    let mut liu_bei = General::new(GeneralId::new(1), world_id, "Liu Bei", now);
    liu_bei.nation_id = shu;
    liu_bei.city_id = chengdu.id;
    liu_bei.officer_level = 12;
    liu_bei.crew = 3_000;

    let mut zhuge_liang = General::new(GeneralId::new(2), world_id, "Zhuge Liang", now);
    zhuge_liang.nation_id = shu;
    zhuge_liang.city_id = chengdu.id;
    zhuge_liang.officer_level = 11;
    zhuge_liang.intel = 100;

    let mut cao_cao = General::new(GeneralId::new(3), world_id, "Cao Cao", now);
    cao_cao.nation_id = wei;
    cao_cao.city_id = xuchang.id;
    cao_cao.officer_level = 12;
    cao_cao.npc_state = 2;
    cao_cao.crew = 5_000;

    let mut lu_bu = General::new(GeneralId::new(4), world_id, "Lu Bu", now);
    lu_bu.block_state = 2;
    lu_bu.kill_turn = Some(3);
    lu_bu.injury = 10;

    let batch = PersistBatch {
        generals: vec![liu_bei, zhuge_liang, cao_cao, lu_bu],
        cities: vec![chengdu, xuchang],
        nations: vec![shu_nation, wei_nation],
        general_queues: vec![(
            GeneralId::new(2),
            vec![
                GeneralTurn::new(GeneralId::new(2), 0, "farm"),
                GeneralTurn::new(GeneralId::new(2), 1, "train"),
            ],
        )],
        nation_queues: vec![(shu, vec![NationTurn::new(shu, 12, 0, "reward")])],
        ..PersistBatch::default()
    };
    Ok((world, batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory_store::InMemoryWorldStore;
    use chrono::{Duration, TimeZone};
    use warband_domain::{AuxMapExt, GameEvent, TurnLifecycleState};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn app_at(store: Arc<InMemoryWorldStore>, now: DateTime<Utc>) -> App {
        let settings = EngineSettings {
            turn_interval: std::time::Duration::from_secs(600),
            commit_sha: "abc123".into(),
            ..EngineSettings::default()
        };
        App::new(store.clone(), store, Arc::new(FixedClock(now)), settings)
    }

    #[tokio::test]
    async fn seeding_only_happens_once() {
        let store = Arc::new(InMemoryWorldStore::new());
        let app = app_at(store.clone(), t0());

        assert!(app.seed_demo_world().await.unwrap());
        assert!(!app.seed_demo_world().await.unwrap());

        let world = store.get(WorldId::new(1)).await.unwrap().unwrap();
        assert_eq!(world.commit_sha(), Some("abc123"));
        assert_eq!(world.tick_seconds(), 600);
        assert_eq!(store.load(world.id()).await.unwrap().generals.len(), 4);
    }

    #[tokio::test]
    async fn daemon_tick_runs_a_full_pass() {
        let store = Arc::new(InMemoryWorldStore::new());
        app_at(store.clone(), t0()).seed_demo_world().await.unwrap();

        let app = app_at(store.clone(), t0() + Duration::seconds(600));
        let mut events = app.events.subscribe();
        let summary = app
            .use_cases
            .turn
            .daemon
            .tick()
            .await
            .unwrap()
            .expect("daemon was idle");

        assert_eq!(summary.processed, vec![WorldId::new(1)]);
        assert_eq!(
            events.recv().await.unwrap(),
            GameEvent::TurnAdvanced {
                world_id: WorldId::new(1),
                year: 184,
                month: 2,
            }
        );
        assert_eq!(
            app.use_cases.turn.status.get_status(WorldId::new(1)),
            TurnLifecycleState::Idle
        );

        let world = store.get(WorldId::new(1)).await.unwrap().unwrap();
        assert_eq!(world.current_month(), 2);

        let records = store.load(WorldId::new(1)).await.unwrap();
        let zhuge = records
            .generals
            .iter()
            .find(|g| g.id == GeneralId::new(2))
            .unwrap();
        assert_eq!(zhuge.last_turn.get_str("actionCode"), Some("farm"));
        // Shu is Confucian, which discounts farming.
        let cost = zhuge.last_turn.get_float("costMultiplier").unwrap();
        assert!((cost - 0.8).abs() < 1e-9);
        let lu_bu = records
            .generals
            .iter()
            .find(|g| g.id == GeneralId::new(4))
            .unwrap();
        assert_eq!(lu_bu.kill_turn, Some(2));
        assert_eq!(records.general_turns.len(), 1);
        assert!(records.nation_turns.is_empty());
        assert_eq!(records.nations[0].strategic_cmd_limit, 2);
    }

    #[tokio::test]
    async fn other_builds_are_left_alone() {
        let store = Arc::new(InMemoryWorldStore::new());
        app_at(store.clone(), t0()).seed_demo_world().await.unwrap();

        let mut app = app_at(store.clone(), t0() + Duration::seconds(600));
        app.settings.commit_sha = "different".into();
        let daemon = TurnDaemon::new(
            app.repositories.world.clone(),
            app.use_cases.turn.coordinator.clone(),
            app.settings.commit_sha.clone(),
        );

        let summary = daemon.tick().await.unwrap().unwrap();

        assert!(summary.processed.is_empty());
        assert_eq!(summary.skipped_other_build, 1);
        let world = store.get(WorldId::new(1)).await.unwrap().unwrap();
        assert_eq!(world.current_month(), 1);
    }
}
