//! Arena Simulation Core
//!
//! Headless combat simulation одиночного FPS на Bevy 0.16 ECS:
//! player locomotion, hitscan оружие, enemy AI, damage & health.
//!
//! Рендер, HUD и input devices живут снаружи:
//! - input приходит снимком `PlayerInput` на каждый тик
//! - геометрия лучей через `HitQueryService`
//! - обратная связь через `PresentationSink`
//!
//! Точка входа - `Simulation` (владеет `App`, тикается вызывающим).

use bevy::ecs::schedule::ExecutorKind;
use bevy::prelude::*;

// Публичные модули
pub mod ai;
pub mod clock;
pub mod combat;
pub mod components;
pub mod config;
pub mod input;
pub mod logger;
pub mod physics;
pub mod presentation;
pub mod random;
pub mod scheduler;
pub mod simulation;
pub mod spawning;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, AIState};
pub use clock::{FrameClock, WallClock};
pub use combat::{
    CatalogError, CombatPlugin, GeometryHitQuery, HitPool, HitQueryService, HitRay, HitScene, RayHit, WeaponCatalog,
    WeaponDefinition, WeaponState, WorldColliders,
};
pub use components::*;
pub use config::{ConfigError, SimulationConfig};
pub use input::{PlayerInput, WeaponSwitch};
pub use physics::LocomotionPlugin;
pub use presentation::{DiscardSink, LogSink, PresentationEvent, PresentationSink};
pub use random::{DeterministicRng, RandomSource, ScriptedRandom};
pub use scheduler::{ScheduledTask, ScheduledTasks};
pub use simulation::{EnemySnapshot, PlayerSnapshot, Simulation, SimulationBuilder, SimulationError};
pub use spawning::EnemyRegistry;

/// Стадии одного тика (строго последовательно)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Дренаж ScheduledTasks (`due <= now`)
    Tasks,
    /// Switch / skin / explicit reload
    Commands,
    Locomotion,
    /// Auto-fire check + combat resolver
    Fire,
    AI,
    /// Регенерация
    Health,
    /// PresentationEvent → outbox
    Presentation,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Ресурсы, вставленные до plugin'а (config, catalog, RNG, hit service),
/// не перезаписываются.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationConfig>();

        if !app.world().contains_resource::<DeterministicRng>() {
            let seed = app.world().resource::<SimulationConfig>().seed;
            app.insert_resource(DeterministicRng::new(seed));
        }

        app
            // Time двигается вручную (Simulation::tick), без wall clock
            .init_resource::<Time>()
            .init_resource::<PlayerInput>()
            .init_resource::<ScheduledTasks>()
            .init_resource::<EnemyRegistry>()
            .init_resource::<presentation::PresentationOutbox>()
            .add_event::<PresentationEvent>();

        // Один поток: порядок RNG бросков и мутаций фиксирован
        app.edit_schedule(Update, |schedule| {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        });

        app.configure_sets(
            Update,
            (
                SimulationSet::Tasks,
                SimulationSet::Commands,
                SimulationSet::Locomotion,
                SimulationSet::Fire,
                SimulationSet::AI,
                SimulationSet::Health,
                SimulationSet::Presentation,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                spawning::process_scheduled_tasks.in_set(SimulationSet::Tasks),
                presentation::collect_presentation_events.in_set(SimulationSet::Presentation),
            ),
        );

        // Подсистемы
        app.add_plugins((CombatPlugin, LocomotionPlugin, AIPlugin));
    }
}
