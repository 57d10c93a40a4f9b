//! Enemy FSM components + чистые функции решений

use bevy::prelude::*;

use crate::config::AIConfig;

/// Поведение врага
///
/// Чистая функция текущей дистанции до игрока: пересчитывается каждый тик,
/// без гистерезиса и памяти о прошлом состоянии.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AIState {
    /// Бродит по случайным направлениям
    #[default]
    Patrol,
    /// Идёт прямо к игроку, не стреляет
    Chase,
    /// Медленно сближается и стреляет
    Attack,
}

impl AIState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AIState::Patrol => "Patrol",
            AIState::Chase => "Chase",
            AIState::Attack => "Attack",
        }
    }
}

/// `d < attack_range` → Attack, `d < chase_range` → Chase, иначе Patrol
pub fn behavior_for_distance(distance: f32, config: &AIConfig) -> AIState {
    if distance < config.attack_range {
        AIState::Attack
    } else if distance < config.chase_range {
        AIState::Chase
    } else {
        AIState::Patrol
    }
}

/// Вероятность попадания врага: ближе = точнее, в пределах [min, max]
pub fn enemy_hit_chance(distance: f32, config: &AIConfig) -> f32 {
    (config.hit_chance_base - distance / config.hit_chance_falloff)
        .clamp(config.hit_chance_min, config.hit_chance_max)
}

/// Дистанция в плоскости XZ (высота глаз игрока не влияет)
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}
