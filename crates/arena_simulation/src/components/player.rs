//! Player компоненты: marker, motion, vitals
//!
//! Позиция игрока - обычный `Transform` (y = высота глаз).
//! Оружие игрока - `Loadout` (crate::combat).

use bevy::prelude::*;
use std::time::Duration;

/// Marker component для player-controlled entity
///
/// AI systems используют `Without<Player>` filter, player systems - `With<Player>`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Скорость и контакт с землёй
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PlayerMotion {
    pub velocity: Vec3,
    pub on_ground: bool,
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            on_ground: true,
        }
    }
}

/// Damage bookkeeping игрока
///
/// - `last_damage`: время последнего ПРИНЯТОГО урона (invulnerability window + regen delay)
/// - `awaiting_respawn`: HP == 0, RespawnPlayer задача в очереди
/// - `regen_carry`: дробный остаток регенерации (HP целые)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerVitals {
    pub last_damage: Option<Duration>,
    pub awaiting_respawn: bool,
    pub regen_carry: f32,
}

impl PlayerVitals {
    /// Сброс после respawn (cooldown очищен)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
