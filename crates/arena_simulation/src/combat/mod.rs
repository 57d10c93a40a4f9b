//! Combat module (hitscan weapons + damage model)
//!
//! ECS ответственность:
//! - Weapon catalog (immutable) + runtime state (патроны, rate gate, reload)
//! - Combat resolver: fire request → pellet rays → damage / impact events
//! - Damage & health: invulnerability window, kill, respawn, regeneration
//!
//! Внешняя ответственность:
//! - HitQueryService: геометрия лучей (по умолчанию `GeometryHitQuery`)
//! - Presentation sink: muzzle flash, hit markers, HUD

use bevy::prelude::*;

pub mod damage;
pub mod hit_query;
pub mod resolver;
pub mod systems;
pub mod weapon_catalog;
pub mod weapon_runtime;

mod resolver_tests;

// Re-export основных типов
pub use damage::{damage_enemy, damage_player, EnemyDamageOutcome, PlayerDamageOutcome};
pub use hit_query::{
    ColliderBox, GeometryHitQuery, HitPool, HitQueries, HitQueryResult, HitQueryService, HitRay, HitScene,
    HitVolume, RayHit, WorldColliders,
};
pub use resolver::{resolve_fire, spread_direction, EnemyHitResolution, FireRequest, PelletOutcome};
pub use weapon_catalog::{CatalogError, WeaponCatalog, WeaponDefinition};
pub use weapon_runtime::{FireGate, FireOutcome, Loadout, ReloadOutcome, WeaponState};

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок внутри тика (через `SimulationSet`):
/// 1. apply_weapon_commands - switch / skin / reload (Commands)
/// 2. player_fire - auto-fire check + resolver (Fire)
/// 3. regenerate_player_health - после AI урона (Health)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WeaponCatalog>()
            .init_resource::<HitQueries>()
            .init_resource::<WorldColliders>();

        app.add_systems(
            Update,
            (
                systems::apply_weapon_commands.in_set(SimulationSet::Commands),
                systems::player_fire.in_set(SimulationSet::Fire),
                systems::regenerate_player_health.in_set(SimulationSet::Health),
            ),
        );
    }
}
