//! Enemy population + deferred lifecycle tasks
//!
//! - registry: HitVolumeHandle → Entity (единственный writer активных врагов)
//! - lifecycle: spawn helpers + дренаж `ScheduledTasks` в начале тика

pub mod lifecycle;
pub mod registry;

pub use lifecycle::{
    enemy_bundle, process_scheduled_tasks, random_spawn_point, spawn_enemy, spawn_enemy_in_world,
};
pub use registry::EnemyRegistry;
