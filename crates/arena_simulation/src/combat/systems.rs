//! Combat systems: weapon commands, player fire, health regeneration

use bevy::prelude::*;

use crate::combat::damage::{damage_enemy, regenerate, EnemyDamageOutcome};
use crate::combat::hit_query::{HitQueries, HitVolume, WorldColliders};
use crate::combat::resolver::{resolve_fire, EnemyHitResolution, FireRequest, PelletOutcome};
use crate::combat::weapon_runtime::{FireOutcome, Loadout, ReloadOutcome};
use crate::combat::WeaponCatalog;
use crate::components::{Enemy, Health, HitVolumeShape, Player, PlayerVitals};
use crate::config::SimulationConfig;
use crate::input::PlayerInput;
use crate::logger;
use crate::presentation::PresentationEvent;
use crate::random::DeterministicRng;
use crate::scheduler::{ScheduledTask, ScheduledTasks};
use crate::spawning::EnemyRegistry;

/// Switch / skin / explicit reload (до стрельбы в том же тике)
///
/// Смена оружия instant и не отменяет перезарядку предыдущего слота.
/// Skin и reload игнорируются, пока игрок мёртв.
pub fn apply_weapon_commands(
    time: Res<Time>,
    input: Res<PlayerInput>,
    catalog: Res<WeaponCatalog>,
    mut tasks: ResMut<ScheduledTasks>,
    mut player: Query<(&mut Loadout, &PlayerVitals), With<Player>>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    let Some((mut loadout, vitals)) = player.iter_mut().next() else {
        return;
    };
    let now = time.elapsed();

    // Switch безусловный (в том числе пока игрок ждёт respawn)
    if let Some(command) = input.switch {
        if loadout.switch(command) {
            let slot = loadout.equipped;
            if let Some(def) = catalog.get(slot) {
                let state = loadout.equipped_state();
                presentation.write(PresentationEvent::AmmoChanged {
                    slot,
                    magazine: state.current_ammo,
                    reserve: state.reserve_ammo,
                });
                presentation.write(PresentationEvent::status(format!("Equipped {}", def.display_name)));
            }
        }
    }

    if vitals.awaiting_respawn {
        return;
    }

    let slot = loadout.equipped;
    let Some(def) = catalog.get(slot) else {
        return;
    };

    if input.cycle_skin && !def.skins.is_empty() {
        let state = loadout.equipped_state_mut();
        state.cycle_skin(def);
        let skin = def.skins[state.skin_index];
        presentation.write(PresentationEvent::status(format!("{} skin: {}", def.display_name, skin)));
    }

    if input.reload {
        if let ReloadOutcome::Started { duration } = loadout.equipped_state_mut().begin_reload(def) {
            tasks.schedule(now + duration, ScheduledTask::ReloadComplete { slot });
            presentation.write(PresentationEvent::status(format!("Reloading {}", def.display_name)));
        }
    }
}

/// Auto-fire check + combat resolver
///
/// Auto оружие стреляет каждый тик пока зажат trigger, semi - только
/// на переходе released → held. Rate-of-fire gate в `WeaponState::try_fire`.
#[allow(clippy::too_many_arguments)]
pub fn player_fire(
    mut commands: Commands,
    time: Res<Time>,
    input: Res<PlayerInput>,
    config: Res<SimulationConfig>,
    catalog: Res<WeaponCatalog>,
    hit_queries: Res<HitQueries>,
    world: Res<WorldColliders>,
    mut rng: ResMut<DeterministicRng>,
    mut tasks: ResMut<ScheduledTasks>,
    mut registry: ResMut<EnemyRegistry>,
    mut player: Query<(&Transform, &mut Loadout, &PlayerVitals), With<Player>>,
    mut enemies: Query<(&Enemy, &Transform, &HitVolumeShape, &mut Health), Without<Player>>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    let Some((player_transform, mut loadout, vitals)) = player.iter_mut().next() else {
        return;
    };

    let was_held = loadout.trigger_held;
    loadout.trigger_held = input.firing;
    if vitals.awaiting_respawn || !input.firing {
        return;
    }

    let now = time.elapsed();
    let slot = loadout.equipped;
    let Some(def) = catalog.get(slot) else {
        return;
    };
    if !def.fully_automatic && was_held {
        return;
    }

    match loadout.equipped_state_mut().try_fire(def, now) {
        FireOutcome::Fired => {}
        FireOutcome::Empty(ReloadOutcome::Started { duration }) => {
            tasks.schedule(now + duration, ScheduledTask::ReloadComplete { slot });
            presentation.write(PresentationEvent::status(format!("Reloading {}", def.display_name)));
            return;
        }
        FireOutcome::Empty(_) | FireOutcome::Reloading | FireOutcome::Cooling => return,
    }

    let state = loadout.equipped_state();
    presentation.write(PresentationEvent::MuzzleFlash { slot });
    presentation.write(PresentationEvent::AmmoChanged {
        slot,
        magazine: state.current_ammo,
        reserve: state.reserve_ammo,
    });

    // Снимок live hit-volumes (только зарегистрированные)
    let mut volumes: Vec<HitVolume> = enemies
        .iter()
        .filter(|(_, _, shape, _)| registry.contains(shape.handle))
        .map(|(_, transform, shape, _)| HitVolume {
            handle: shape.handle,
            center: transform.translation,
            radius: shape.radius,
        })
        .collect();
    volumes.sort_by_key(|volume| volume.handle);

    let request = FireRequest::new(def, player_transform.translation, input.aim_direction());
    let respawn_delay = config.damage.enemy_respawn_delay();

    let outcomes = resolve_fire(
        &request,
        &*hit_queries.service,
        &mut volumes,
        &world,
        &mut *rng,
        |handle, damage| {
            let Some(entity) = registry.entity(handle) else {
                return EnemyHitResolution::Stale;
            };
            let Ok((enemy, _, _, mut health)) = enemies.get_mut(entity) else {
                return EnemyHitResolution::Stale;
            };
            let id = enemy.id;

            match damage_enemy(&mut health, damage) {
                EnemyDamageOutcome::Wounded { fraction } => {
                    presentation.write(PresentationEvent::EnemyHealthChanged { enemy: id, fraction });
                    EnemyHitResolution::Applied { killed: false }
                }
                EnemyDamageOutcome::Killed => {
                    // Снятие с регистрации до следующего запроса
                    registry.unregister(handle);
                    commands.entity(entity).despawn();
                    tasks.schedule(now + respawn_delay, ScheduledTask::SpawnEnemy);

                    presentation.write(PresentationEvent::EnemyHealthChanged { enemy: id, fraction: 0.0 });
                    presentation.write(PresentationEvent::status("Enemy eliminated"));
                    logger::log_info(&format!("{} eliminated at {:.2}s", id, now.as_secs_f32()));
                    EnemyHitResolution::Applied { killed: true }
                }
            }
        },
    );

    for outcome in outcomes {
        match outcome {
            PelletOutcome::EnemyHit { point, .. } => {
                presentation.write(PresentationEvent::HitMarker { point });
            }
            PelletOutcome::WorldImpact { point, normal } => {
                presentation.write(PresentationEvent::Impact { point, normal });
            }
            PelletOutcome::Miss => {}
        }
    }
}

/// Регенерация HP игрока после паузы без урона
pub fn regenerate_player_health(
    time: Res<Time>,
    config: Res<SimulationConfig>,
    mut player: Query<(&mut Health, &mut PlayerVitals), With<Player>>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    let now = time.elapsed();
    let delta = time.delta();

    for (mut health, mut vitals) in player.iter_mut() {
        if regenerate(&mut health, &mut vitals, now, delta, &config.damage) > 0 {
            presentation.write(PresentationEvent::PlayerHealthChanged {
                fraction: health.fraction(),
            });
        }
    }
}
