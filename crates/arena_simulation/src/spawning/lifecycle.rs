//! Spawn / respawn lifecycle
//!
//! `process_scheduled_tasks` - первая система тика: всё, что должно было
//! случиться к `now` (конец перезарядки, respawn игрока, замена врага),
//! выполняется до locomotion и стрельбы.

use bevy::prelude::*;
use std::time::Duration;

use super::registry::EnemyRegistry;
use crate::ai::{horizontal_distance, AIState};
use crate::combat::damage::respawn_player;
use crate::combat::{Loadout, WeaponCatalog};
use crate::components::{Enemy, EnemyFire, EnemyId, Health, HitVolumeShape, Player, PlayerMotion, PlayerVitals, Wander};
use crate::config::SimulationConfig;
use crate::logger;
use crate::presentation::PresentationEvent;
use crate::random::{DeterministicRng, RandomSource};
use crate::scheduler::{ScheduledTask, ScheduledTasks};

/// Сколько раз пробуем найти точку дальше `min_spawn_distance` (последняя принимается)
const SPAWN_ATTEMPTS: usize = 8;

/// Полный набор компонентов врага
pub fn enemy_bundle(
    enemy: Enemy,
    shape: HitVolumeShape,
    position: Vec3,
    config: &SimulationConfig,
    now: Duration,
) -> impl Bundle {
    (
        enemy,
        shape,
        Transform::from_translation(position),
        Health::new(config.damage.enemy_max_health),
        AIState::default(),
        Wander::pending(now),
        EnemyFire::default(),
    )
}

/// Случайная точка внутри inset bounds, не ближе `min_spawn_distance` к игроку
pub fn random_spawn_point(rng: &mut dyn RandomSource, config: &SimulationConfig, player: Vec3) -> Vec3 {
    let world = &config.world;
    let limit = (world.half_extent - config.ai.bounds_margin).max(0.0);

    let mut candidate = Vec3::new(0.0, world.enemy_height, 0.0);
    for _ in 0..SPAWN_ATTEMPTS {
        candidate = Vec3::new(
            rng.range_f32(-limit, limit),
            world.enemy_height,
            rng.range_f32(-limit, limit),
        );
        if horizontal_distance(candidate, player) >= world.min_spawn_distance {
            break;
        }
    }
    candidate
}

/// Spawn через Commands (из систем). Регистрация в том же вызове.
pub fn spawn_enemy(
    commands: &mut Commands,
    registry: &mut EnemyRegistry,
    position: Vec3,
    config: &SimulationConfig,
    now: Duration,
) -> EnemyId {
    let (id, handle) = registry.allocate();
    let shape = HitVolumeShape {
        handle,
        radius: config.world.enemy_radius,
    };
    let entity = commands
        .spawn(enemy_bundle(Enemy { id }, shape, position, config, now))
        .id();
    registry.register(handle, id, entity);
    id
}

/// Spawn напрямую в World (начальная популяция, тестовые хуки)
pub fn spawn_enemy_in_world(world: &mut World, position: Vec3) -> EnemyId {
    let now = world.resource::<Time>().elapsed();
    let config = world.resource::<SimulationConfig>().clone();

    let (id, handle) = world.resource_mut::<EnemyRegistry>().allocate();
    let shape = HitVolumeShape {
        handle,
        radius: config.world.enemy_radius,
    };
    let entity = world
        .spawn(enemy_bundle(Enemy { id }, shape, position, &config, now))
        .id();
    world.resource_mut::<EnemyRegistry>().register(handle, id, entity);
    id
}

/// Дренаж очереди задач (`due <= now`), первая система тика
#[allow(clippy::too_many_arguments)]
pub fn process_scheduled_tasks(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SimulationConfig>,
    catalog: Res<WeaponCatalog>,
    mut tasks: ResMut<ScheduledTasks>,
    mut registry: ResMut<EnemyRegistry>,
    mut rng: ResMut<DeterministicRng>,
    mut player: Query<(&mut Transform, &mut Health, &mut PlayerVitals, &mut PlayerMotion, &mut Loadout), With<Player>>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    let now = time.elapsed();

    while let Some(task) = tasks.pop_due(now) {
        match task {
            ScheduledTask::ReloadComplete { slot } => {
                let Some((_, _, _, _, mut loadout)) = player.iter_mut().next() else {
                    continue;
                };
                let (Some(def), Some(state)) = (catalog.get(slot), loadout.slots.get_mut(slot)) else {
                    continue;
                };

                let transferred = state.finish_reload(def);
                logger::log(&format!("{} reloaded (+{} rounds)", def.display_name, transferred));
                presentation.write(PresentationEvent::AmmoChanged {
                    slot,
                    magazine: state.current_ammo,
                    reserve: state.reserve_ammo,
                });
                presentation.write(PresentationEvent::status(format!("{} reloaded", def.display_name)));
            }

            ScheduledTask::RespawnPlayer => {
                let Some((mut transform, mut health, mut vitals, mut motion, _)) = player.iter_mut().next() else {
                    continue;
                };

                respawn_player(&mut health, &mut vitals, &mut motion, &mut transform, &config.world);
                logger::log_info(&format!("Player respawned at {:.2}s", now.as_secs_f32()));
                presentation.write(PresentationEvent::PlayerHealthChanged {
                    fraction: health.fraction(),
                });
                presentation.write(PresentationEvent::status("Respawned"));
            }

            ScheduledTask::SpawnEnemy => {
                let player_position = player
                    .iter()
                    .next()
                    .map_or(config.world.player_spawn(), |(transform, ..)| transform.translation);
                let position = random_spawn_point(&mut *rng, &config, player_position);
                let id = spawn_enemy(&mut commands, &mut registry, position, &config, now);
                logger::log(&format!("{} spawned at {:?}", id, position));
            }
        }
    }
}
