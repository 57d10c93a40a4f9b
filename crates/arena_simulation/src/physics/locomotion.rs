//! Player locomotion controller
//!
//! Порядок шага (один тик):
//! 1. Intent из input → normalize → rotate by yaw (pitch не влияет)
//! 2. velocity.xz плавно тянется к target: `v += (target - v) * clamp(accel * dt, 0, 1)`
//! 3. Gravity если в воздухе, jump если на земле
//! 4. position += velocity * dt
//! 5. Ground snap на eye height, clamp XZ по границам мира

use bevy::prelude::*;

use crate::components::{Player, PlayerMotion, PlayerVitals};
use crate::config::{LocomotionConfig, SimulationConfig};
use crate::input::PlayerInput;
use crate::SimulationSet;

/// Один шаг контроллера (чистая функция над компонентами)
pub fn step_locomotion(
    transform: &mut Transform,
    motion: &mut PlayerMotion,
    input: &PlayerInput,
    dt: f32,
    config: &LocomotionConfig,
    half_extent: f32,
) {
    let intent = input.move_intent().normalize_or_zero();
    let direction = Quat::from_rotation_y(input.yaw) * intent;

    let speed = if input.sprint {
        config.move_speed * config.sprint_multiplier
    } else {
        config.move_speed
    };
    let target = direction * speed;

    // Clamp не даёт overshoot на больших dt
    let blend = (config.acceleration * dt).clamp(0.0, 1.0);
    motion.velocity.x += (target.x - motion.velocity.x) * blend;
    motion.velocity.z += (target.z - motion.velocity.z) * blend;

    if motion.on_ground {
        if input.jump {
            motion.velocity.y = config.jump_speed;
            motion.on_ground = false;
        }
    } else {
        motion.velocity.y -= config.gravity * dt;
    }

    transform.translation += motion.velocity * dt;

    if transform.translation.y <= config.eye_height {
        transform.translation.y = config.eye_height;
        motion.velocity.y = 0.0;
        motion.on_ground = true;
    } else {
        motion.on_ground = false;
    }

    let limit = (half_extent - config.bounds_margin).max(0.0);
    transform.translation.x = transform.translation.x.clamp(-limit, limit);
    transform.translation.z = transform.translation.z.clamp(-limit, limit);

    transform.rotation = Quat::from_rotation_y(input.yaw);
}

/// Система locomotion игрока (мёртвый игрок не двигается)
pub fn player_locomotion(
    time: Res<Time>,
    input: Res<PlayerInput>,
    config: Res<SimulationConfig>,
    mut query: Query<(&mut Transform, &mut PlayerMotion, &PlayerVitals), With<Player>>,
) {
    let dt = time.delta_secs();

    for (mut transform, mut motion, vitals) in query.iter_mut() {
        if vitals.awaiting_respawn {
            continue;
        }
        step_locomotion(
            &mut transform,
            &mut motion,
            &input,
            dt,
            &config.locomotion,
            config.world.half_extent,
        );
    }
}

pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, player_locomotion.in_set(SimulationSet::Locomotion));
    }
}
