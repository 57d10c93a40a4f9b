//! Конфигурация симуляции
//!
//! Все числовые константы боя и движения живут здесь. `Default` = боевые
//! значения, JSON override частичный (каждая секция `#[serde(default)]`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::logger::LogLevel;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Корневой конфиг (resource)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub log_level: LogLevel,
    pub clock: ClockConfig,
    pub locomotion: LocomotionConfig,
    pub ai: AIConfig,
    pub damage: DamageConfig,
    pub world: WorldConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            log_level: LogLevel::Info,
            clock: ClockConfig::default(),
            locomotion: LocomotionConfig::default(),
            ai: AIConfig::default(),
            damage: DamageConfig::default(),
            world: WorldConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Верхняя граница delta одного тика (ms)
    pub max_delta_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { max_delta_ms: 50 }
    }
}

impl ClockConfig {
    pub fn max_delta(&self) -> Duration {
        Duration::from_millis(self.max_delta_ms)
    }
}

/// Параметры player locomotion (units/sec)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub move_speed: f32,
    pub sprint_multiplier: f32,
    /// Скорость схождения velocity → target (1/sec)
    pub acceleration: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    /// Высота глаз над полом (y позиции игрока на земле)
    pub eye_height: f32,
    /// Отступ от края мира
    pub bounds_margin: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 220.0,
            sprint_multiplier: 1.6,
            acceleration: 10.0,
            gravity: 980.0,
            jump_speed: 380.0,
            eye_height: 60.0,
            bounds_margin: 40.0,
        }
    }
}

/// Параметры enemy AI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AIConfig {
    /// d < attack_range → Attack
    pub attack_range: f32,
    /// d < chase_range → Chase
    pub chase_range: f32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub attack_speed: f32,
    /// Интервал смены wander heading (sec), `[min, max)`
    pub wander_interval_min: f32,
    pub wander_interval_max: f32,
    /// Пауза между выстрелами врага (ms)
    pub fire_interval_ms: u64,
    /// hit chance = clamp(base - d / falloff, min, max)
    pub hit_chance_base: f32,
    pub hit_chance_falloff: f32,
    pub hit_chance_min: f32,
    pub hit_chance_max: f32,
    pub damage_min: u32,
    pub damage_max: u32,
    /// Разброс cosmetic near-miss точки вокруг игрока
    pub near_miss_horizontal: f32,
    pub near_miss_vertical: f32,
    pub bounds_margin: f32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            attack_range: 700.0,
            chase_range: 1100.0,
            patrol_speed: 60.0,
            chase_speed: 80.0,
            attack_speed: 20.0,
            wander_interval_min: 1.5,
            wander_interval_max: 3.5,
            fire_interval_ms: 800,
            hit_chance_base: 0.6,
            hit_chance_falloff: 2000.0,
            hit_chance_min: 0.05,
            hit_chance_max: 0.35,
            damage_min: 6,
            damage_max: 14,
            near_miss_horizontal: 40.0,
            near_miss_vertical: 20.0,
            bounds_margin: 50.0,
        }
    }
}

impl AIConfig {
    pub fn fire_interval(&self) -> Duration {
        Duration::from_millis(self.fire_interval_ms)
    }
}

/// Damage & health параметры
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    pub player_max_health: u32,
    /// Invulnerability window (ms) - один на все источники урона
    pub invulnerability_ms: u64,
    pub respawn_delay_ms: u64,
    pub regen_delay_ms: u64,
    pub regen_per_second: f32,
    pub enemy_max_health: u32,
    pub enemy_respawn_delay_ms: u64,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            player_max_health: 100,
            invulnerability_ms: 200,
            respawn_delay_ms: 3000,
            regen_delay_ms: 4000,
            regen_per_second: 8.0,
            enemy_max_health: 100,
            enemy_respawn_delay_ms: 3000,
        }
    }
}

impl DamageConfig {
    pub fn invulnerability(&self) -> Duration {
        Duration::from_millis(self.invulnerability_ms)
    }

    pub fn respawn_delay(&self) -> Duration {
        Duration::from_millis(self.respawn_delay_ms)
    }

    pub fn regen_delay(&self) -> Duration {
        Duration::from_millis(self.regen_delay_ms)
    }

    pub fn enemy_respawn_delay(&self) -> Duration {
        Duration::from_millis(self.enemy_respawn_delay_ms)
    }
}

/// Арена: квадрат `[-half_extent, half_extent]` по X/Z, пол на y = 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub half_extent: f32,
    pub player_spawn: [f32; 3],
    pub enemy_count: usize,
    /// Минимальная дистанция спавна врага от игрока
    pub min_spawn_distance: f32,
    /// Высота центра hit-volume врага над полом
    pub enemy_height: f32,
    /// Радиус hit-volume (сфера)
    pub enemy_radius: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            half_extent: 2000.0,
            player_spawn: [0.0, 60.0, 0.0],
            enemy_count: 6,
            min_spawn_distance: 400.0,
            enemy_height: 50.0,
            enemy_radius: 35.0,
        }
    }
}

impl WorldConfig {
    pub fn player_spawn(&self) -> Vec3 {
        Vec3::from_array(self.player_spawn)
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {}", value),
                })
            }
        }

        if self.clock.max_delta_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "clock.max_delta_ms",
                reason: "must be at least 1 ms".to_string(),
            });
        }

        positive("locomotion.gravity", self.locomotion.gravity)?;
        positive("locomotion.eye_height", self.locomotion.eye_height)?;
        positive("locomotion.move_speed", self.locomotion.move_speed)?;
        positive("world.half_extent", self.world.half_extent)?;
        positive("world.enemy_radius", self.world.enemy_radius)?;

        if self.ai.attack_range >= self.ai.chase_range {
            return Err(ConfigError::Invalid {
                field: "ai.attack_range",
                reason: format!(
                    "attack range {} must be below chase range {}",
                    self.ai.attack_range, self.ai.chase_range
                ),
            });
        }

        if self.ai.wander_interval_min > self.ai.wander_interval_max {
            return Err(ConfigError::Invalid {
                field: "ai.wander_interval_min",
                reason: "min interval exceeds max interval".to_string(),
            });
        }

        positive("ai.hit_chance_falloff", self.ai.hit_chance_falloff)?;
        for (field, value) in [
            ("ai.hit_chance_min", self.ai.hit_chance_min),
            ("ai.hit_chance_max", self.ai.hit_chance_max),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("probability must be within [0, 1], got {}", value),
                });
            }
        }
        if self.ai.hit_chance_min > self.ai.hit_chance_max {
            return Err(ConfigError::Invalid {
                field: "ai.hit_chance_min",
                reason: "min hit chance exceeds max hit chance".to_string(),
            });
        }

        if self.ai.damage_min > self.ai.damage_max {
            return Err(ConfigError::Invalid {
                field: "ai.damage_min",
                reason: "min damage exceeds max damage".to_string(),
            });
        }

        if self.damage.player_max_health == 0 || self.damage.enemy_max_health == 0 {
            return Err(ConfigError::Invalid {
                field: "damage.player_max_health",
                reason: "max health must be non-zero".to_string(),
            });
        }

        let margin = self.locomotion.bounds_margin.max(self.ai.bounds_margin);
        if margin >= self.world.half_extent {
            return Err(ConfigError::Invalid {
                field: "world.half_extent",
                reason: "world is smaller than its bounds margin".to_string(),
            });
        }

        Ok(())
    }
}
