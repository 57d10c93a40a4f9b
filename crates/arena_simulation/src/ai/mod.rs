//! Enemy AI: per-enemy FSM (Patrol / Chase / Attack)
//!
//! Состояние пересчитывается каждый тик из горизонтальной дистанции
//! до игрока. Attack стреляет вероятностно (hit chance падает с дистанцией),
//! промах даёт только cosmetic impact. Урон идёт через damage model,
//! поэтому окно неуязвимости игрока действует и для врагов.

use bevy::prelude::*;

pub mod components;
pub mod systems;


pub use components::{behavior_for_distance, enemy_hit_chance, horizontal_distance, AIState};
pub use systems::enemy_ai;

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует `enemy_ai` в `SimulationSet::AI` (после player fire).
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, enemy_ai.in_set(SimulationSet::AI));
    }
}
