//! Damage & Health model
//!
//! Чистые функции над компонентами; системы и планирование задач
//! (respawn, замена врага) - вызывающая сторона.

use bevy::prelude::*;
use std::time::Duration;

use crate::components::{Health, PlayerMotion, PlayerVitals};
use crate::config::{DamageConfig, WorldConfig};

/// Результат `damage_player`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerDamageOutcome {
    /// Invulnerability window или игрок уже мёртв
    Ignored,
    Damaged { fraction: f32 },
    /// HP == 0, нужно поставить RespawnPlayer
    Killed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyDamageOutcome {
    Wounded { fraction: f32 },
    /// Снять с регистрации немедленно + поставить SpawnEnemy
    Killed,
}

/// Урон игроку
///
/// Окно неуязвимости одно на все источники урона.
pub fn damage_player(
    health: &mut Health,
    vitals: &mut PlayerVitals,
    amount: u32,
    now: Duration,
    config: &DamageConfig,
) -> PlayerDamageOutcome {
    if vitals.awaiting_respawn || !health.is_alive() {
        return PlayerDamageOutcome::Ignored;
    }
    if let Some(last) = vitals.last_damage {
        if now.saturating_sub(last) < config.invulnerability() {
            return PlayerDamageOutcome::Ignored;
        }
    }

    vitals.last_damage = Some(now);
    vitals.regen_carry = 0.0;
    health.take_damage(amount);

    if health.is_alive() {
        PlayerDamageOutcome::Damaged {
            fraction: health.fraction(),
        }
    } else {
        vitals.awaiting_respawn = true;
        PlayerDamageOutcome::Killed
    }
}

/// Урон врагу (без окна неуязвимости)
pub fn damage_enemy(health: &mut Health, amount: u32) -> EnemyDamageOutcome {
    health.take_damage(amount);
    if health.is_alive() {
        EnemyDamageOutcome::Wounded {
            fraction: health.fraction(),
        }
    } else {
        EnemyDamageOutcome::Killed
    }
}

/// Регенерация после `regen_delay` без урона. Возвращает добавленное HP.
pub fn regenerate(
    health: &mut Health,
    vitals: &mut PlayerVitals,
    now: Duration,
    delta: Duration,
    config: &DamageConfig,
) -> u32 {
    if vitals.awaiting_respawn || !health.is_alive() || health.current >= health.max {
        vitals.regen_carry = 0.0;
        return 0;
    }

    let since_damage = vitals.last_damage.map_or(now, |last| now.saturating_sub(last));
    if since_damage < config.regen_delay() {
        return 0;
    }

    vitals.regen_carry += config.regen_per_second * delta.as_secs_f32();
    let whole = vitals.regen_carry.floor();
    if whole < 1.0 {
        return 0;
    }

    vitals.regen_carry -= whole;
    health.heal(whole as u32)
}

/// Respawn: полное HP, spawn point, нулевая скорость, cooldown очищен
pub fn respawn_player(
    health: &mut Health,
    vitals: &mut PlayerVitals,
    motion: &mut PlayerMotion,
    transform: &mut Transform,
    world: &WorldConfig,
) {
    health.restore_full();
    vitals.reset();
    *motion = PlayerMotion::default();
    transform.translation = world.player_spawn();
}
