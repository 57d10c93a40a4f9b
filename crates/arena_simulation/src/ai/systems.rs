//! Enemy AI system: FSM transition → movement → enemy-initiated fire

use bevy::prelude::*;
use std::f32::consts::TAU;
use std::time::Duration;

use super::components::{behavior_for_distance, enemy_hit_chance, horizontal_distance, AIState};
use crate::combat::damage::{damage_player, PlayerDamageOutcome};
use crate::components::{Enemy, EnemyFire, Health, Player, PlayerVitals, Wander};
use crate::config::{AIConfig, SimulationConfig};
use crate::logger;
use crate::presentation::PresentationEvent;
use crate::random::{DeterministicRng, RandomSource};
use crate::scheduler::{ScheduledTask, ScheduledTasks};

/// Главный цикл AI (после player fire в том же тике)
///
/// Враги обходятся в порядке `EnemyId`: порядок RNG бросков стабилен.
pub fn enemy_ai(
    time: Res<Time>,
    config: Res<SimulationConfig>,
    mut rng: ResMut<DeterministicRng>,
    mut tasks: ResMut<ScheduledTasks>,
    mut enemies: Query<(&Enemy, &mut Transform, &mut AIState, &mut Wander, &mut EnemyFire), Without<Player>>,
    mut player: Query<(&Transform, &mut Health, &mut PlayerVitals), (With<Player>, Without<Enemy>)>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    let Some((player_transform, mut player_health, mut vitals)) = player.iter_mut().next() else {
        return;
    };
    let player_position = player_transform.translation;

    let now = time.elapsed();
    let dt = time.delta_secs();
    let ai = &config.ai;

    let mut ordered: Vec<_> = enemies.iter_mut().collect();
    ordered.sort_by_key(|(enemy, ..)| enemy.id);

    for (enemy, mut transform, mut state, mut wander, mut fire) in ordered {
        let position = transform.translation;
        let distance = horizontal_distance(position, player_position);

        let next = behavior_for_distance(distance, ai);
        if next != *state {
            logger::log(&format!(
                "{}: {} → {} (d = {:.0})",
                enemy.id,
                state.as_str(),
                next.as_str(),
                distance
            ));
            *state = next;
        }

        let toward_player = Vec3::new(player_position.x - position.x, 0.0, player_position.z - position.z)
            .normalize_or_zero();

        let step = match next {
            AIState::Patrol => {
                if now >= wander.next_change {
                    let angle = rng.next_unit() * TAU;
                    wander.heading = Vec3::new(angle.cos(), 0.0, angle.sin());
                    let interval = rng.range_f32(ai.wander_interval_min, ai.wander_interval_max);
                    wander.next_change = now + Duration::from_secs_f32(interval.max(0.0));
                }
                wander.heading * ai.patrol_speed
            }
            AIState::Chase => toward_player * ai.chase_speed,
            AIState::Attack => {
                if fire.ready(now, ai.fire_interval()) {
                    fire.last_fire = Some(now);
                    enemy_shot(
                        distance,
                        player_position,
                        &mut player_health,
                        &mut vitals,
                        now,
                        &config,
                        &mut *rng,
                        &mut tasks,
                        &mut presentation,
                    );
                }
                toward_player * ai.attack_speed
            }
        };

        transform.translation += step * dt;
        clamp_to_bounds(&mut transform.translation, config.world.half_extent, ai);

        let look_target = Vec3::new(player_position.x, transform.translation.y, player_position.z);
        if horizontal_distance(look_target, transform.translation) > f32::EPSILON {
            transform.look_at(look_target, Vec3::Y);
        }
    }
}

fn clamp_to_bounds(position: &mut Vec3, half_extent: f32, ai: &AIConfig) {
    let limit = (half_extent - ai.bounds_margin).max(0.0);
    position.x = position.x.clamp(-limit, limit);
    position.z = position.z.clamp(-limit, limit);
}

/// Выстрел врага: вероятностный, без geometric trace
///
/// Промах → cosmetic near-miss impact рядом с игроком (без normal).
#[allow(clippy::too_many_arguments)]
fn enemy_shot(
    distance: f32,
    player_position: Vec3,
    health: &mut Health,
    vitals: &mut PlayerVitals,
    now: Duration,
    config: &SimulationConfig,
    rng: &mut dyn RandomSource,
    tasks: &mut ScheduledTasks,
    presentation: &mut EventWriter<PresentationEvent>,
) {
    let ai = &config.ai;
    let chance = enemy_hit_chance(distance, ai);

    if rng.next_unit() >= chance {
        let offset = Vec3::new(
            rng.signed_unit() * ai.near_miss_horizontal,
            rng.signed_unit() * ai.near_miss_vertical,
            rng.signed_unit() * ai.near_miss_horizontal,
        );
        presentation.write(PresentationEvent::Impact {
            point: player_position + offset,
            normal: None,
        });
        return;
    }

    let amount = rng.range_inclusive_u32(ai.damage_min, ai.damage_max);
    match damage_player(health, vitals, amount, now, &config.damage) {
        PlayerDamageOutcome::Ignored => {}
        PlayerDamageOutcome::Damaged { fraction } => {
            presentation.write(PresentationEvent::PlayerHealthChanged { fraction });
        }
        PlayerDamageOutcome::Killed => {
            tasks.schedule(now + config.damage.respawn_delay(), ScheduledTask::RespawnPlayer);
            presentation.write(PresentationEvent::PlayerHealthChanged { fraction: 0.0 });
            presentation.write(PresentationEvent::status("You were killed"));
            logger::log_info(&format!("Player killed at {:.2}s", now.as_secs_f32()));
        }
    }
}
