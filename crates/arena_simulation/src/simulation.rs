//! Simulation context
//!
//! Явный контекст вместо глобального состояния: `Simulation` владеет Bevy
//! `App`, несколько экземпляров независимы (кроме process-wide logger).
//! Вызывающий сам решает, когда тикать и какой delta подавать.

use bevy::prelude::*;
use std::time::Duration;
use thiserror::Error;

use crate::ai::AIState;
use crate::clock::FrameClock;
use crate::combat::{CatalogError, HitQueries, HitQueryService, Loadout, WeaponCatalog, WeaponDefinition, WeaponState, WorldColliders};
use crate::components::{EnemyId, Health, Player, PlayerMotion, PlayerVitals};
use crate::config::{ConfigError, SimulationConfig};
use crate::input::PlayerInput;
use crate::logger;
use crate::presentation::{PresentationOutbox, PresentationSink};
use crate::random::{DeterministicRng, RandomSource};
use crate::scheduler::{ScheduledTask, ScheduledTasks};
use crate::spawning::{random_spawn_point, spawn_enemy_in_world, EnemyRegistry};
use crate::SimulationPlugin;

/// Ошибки построения (сам тик не падает никогда)
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid weapon catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Снимок игрока (read-only)
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub health: u32,
    pub max_health: u32,
    pub last_damage: Option<Duration>,
    pub awaiting_respawn: bool,
    pub equipped: usize,
}

/// Снимок активного врага
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySnapshot {
    pub id: EnemyId,
    pub position: Vec3,
    pub health: u32,
    pub state: AIState,
}

/// Builder: подмена каталога, hit service, RNG, геометрии и стартовых врагов
#[derive(Default)]
pub struct SimulationBuilder {
    config: SimulationConfig,
    catalog: Option<Vec<WeaponDefinition>>,
    hit_service: Option<Box<dyn HitQueryService>>,
    random_source: Option<Box<dyn RandomSource>>,
    world_colliders: Option<WorldColliders>,
    enemy_positions: Option<Vec<Vec3>>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Свой набор оружия (валидируется в `build`)
    pub fn catalog(mut self, weapons: Vec<WeaponDefinition>) -> Self {
        self.catalog = Some(weapons);
        self
    }

    pub fn hit_service(mut self, service: impl HitQueryService + 'static) -> Self {
        self.hit_service = Some(Box::new(service));
        self
    }

    pub fn random_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.random_source = Some(Box::new(source));
        self
    }

    pub fn world_colliders(mut self, colliders: WorldColliders) -> Self {
        self.world_colliders = Some(colliders);
        self
    }

    /// Фиксированные стартовые позиции врагов вместо случайных
    /// (пустой список = арена без врагов)
    pub fn enemy_positions(mut self, positions: Vec<Vec3>) -> Self {
        self.enemy_positions = Some(positions);
        self
    }

    pub fn build(self) -> Result<Simulation, SimulationError> {
        let config = self.config;
        config.validate()?;

        let catalog = match self.catalog {
            Some(weapons) => WeaponCatalog::new(weapons)?,
            None => WeaponCatalog::standard(),
        };

        logger::init_logger();
        logger::set_log_level(config.log_level);

        let rng = match self.random_source {
            Some(source) => DeterministicRng::with_source(config.seed, source),
            None => DeterministicRng::new(config.seed),
        };

        let mut app = App::new();
        app.insert_resource(config.clone())
            .insert_resource(catalog.clone())
            .insert_resource(rng)
            .insert_resource(self.world_colliders.unwrap_or_default());
        if let Some(service) = self.hit_service {
            app.insert_resource(HitQueries::new(service));
        }
        app.add_plugins(SimulationPlugin);
        app.finish();
        app.cleanup();

        let spawn = config.world.player_spawn();
        let player = app
            .world_mut()
            .spawn((
                Player,
                Transform::from_translation(spawn),
                PlayerMotion::default(),
                PlayerVitals::default(),
                Health::new(config.damage.player_max_health),
                Loadout::from_catalog(&catalog),
            ))
            .id();

        let positions = match self.enemy_positions {
            Some(positions) => positions,
            None => {
                let world = app.world_mut();
                let mut rng = world.resource_mut::<DeterministicRng>();
                (0..config.world.enemy_count)
                    .map(|_| random_spawn_point(&mut *rng, &config, spawn))
                    .collect()
            }
        };
        for position in positions {
            spawn_enemy_in_world(app.world_mut(), position);
        }

        logger::log_info(&format!(
            "Simulation ready: seed {}, {} weapons, {} enemies",
            config.seed,
            catalog.len(),
            app.world().resource::<EnemyRegistry>().len()
        ));

        Ok(Simulation {
            app,
            clock: FrameClock::new(config.clock.max_delta()),
            player,
        })
    }
}

pub struct Simulation {
    app: App,
    clock: FrameClock,
    player: Entity,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        SimulationBuilder::new().config(config).build()
    }

    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Один тик: clamp delta → advance Time → systems → outbox в sink
    pub fn tick(&mut self, raw_delta: Duration, input: PlayerInput, sink: &mut dyn PresentationSink) {
        let delta = self.clock.clamp(raw_delta);

        let world = self.app.world_mut();
        world.resource_mut::<Time>().advance_by(delta);
        *world.resource_mut::<PlayerInput>() = input;

        self.app.update();

        let events = self.app.world_mut().resource_mut::<PresentationOutbox>().drain();
        for event in &events {
            sink.emit(event);
        }
    }

    /// Время с начала симуляции
    pub fn now(&self) -> Duration {
        self.app.world().resource::<Time>().elapsed()
    }

    pub fn player(&self) -> PlayerSnapshot {
        let world = self.app.world();
        let entity = self.player;

        let transform = world.get::<Transform>(entity).copied().unwrap_or_default();
        let motion = world.get::<PlayerMotion>(entity).copied().unwrap_or_default();
        let vitals = world.get::<PlayerVitals>(entity).copied().unwrap_or_default();
        let health = world.get::<Health>(entity).copied().unwrap_or_default();
        let equipped = world.get::<Loadout>(entity).map_or(0, |loadout| loadout.equipped);

        PlayerSnapshot {
            position: transform.translation,
            velocity: motion.velocity,
            on_ground: motion.on_ground,
            health: health.current,
            max_health: health.max,
            last_damage: vitals.last_damage,
            awaiting_respawn: vitals.awaiting_respawn,
            equipped,
        }
    }

    /// Активные враги в порядке регистрации
    pub fn enemies(&self) -> Vec<EnemySnapshot> {
        let world = self.app.world();
        world
            .resource::<EnemyRegistry>()
            .iter()
            .filter_map(|(_, id, entity)| {
                let transform = world.get::<Transform>(entity)?;
                let health = world.get::<Health>(entity)?;
                let state = world.get::<AIState>(entity)?;
                Some(EnemySnapshot {
                    id,
                    position: transform.translation,
                    health: health.current,
                    state: *state,
                })
            })
            .collect()
    }

    pub fn weapon_state(&self, slot: usize) -> Option<WeaponState> {
        self.app
            .world()
            .get::<Loadout>(self.player)
            .and_then(|loadout| loadout.slots.get(slot).cloned())
    }

    pub fn catalog(&self) -> &WeaponCatalog {
        self.app.world().resource::<WeaponCatalog>()
    }

    pub fn config(&self) -> &SimulationConfig {
        self.app.world().resource::<SimulationConfig>()
    }

    pub fn pending_tasks(&self) -> usize {
        self.app.world().resource::<ScheduledTasks>().len()
    }

    pub fn is_scheduled(&self, task: ScheduledTask) -> bool {
        self.app.world().resource::<ScheduledTasks>().contains(task)
    }

    /// Test hook: враг в заданной точке (регистрируется сразу)
    pub fn spawn_enemy_at(&mut self, position: Vec3) -> EnemyId {
        spawn_enemy_in_world(self.app.world_mut(), position)
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// Snapshot состояния для сравнения детерминизма
    pub fn snapshot(&self) -> Vec<u8> {
        let mut snapshot = Vec::new();
        snapshot.extend_from_slice(format!("{:?}", self.player()).as_bytes());
        if let Some(loadout) = self.app.world().get::<Loadout>(self.player) {
            snapshot.extend_from_slice(format!("{:?}", loadout).as_bytes());
        }
        for enemy in self.enemies() {
            snapshot.extend_from_slice(&enemy.id.0.to_le_bytes());
            snapshot.extend_from_slice(format!("{:?}", enemy).as_bytes());
        }
        snapshot
    }
}
