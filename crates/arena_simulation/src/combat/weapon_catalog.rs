//! Weapon catalog - неизменяемые определения оружия
//!
//! Один `WeaponDefinition` на archetype. Runtime state (патроны, таймеры)
//! живёт отдельно в `WeaponState`, по одному на каждую запись каталога.

use bevy::prelude::*;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("weapon catalog is empty")]
    Empty,

    #[error("weapon `{id}`: {reason}")]
    InvalidDefinition { id: String, reason: &'static str },

    #[error("duplicate weapon id `{0}`")]
    DuplicateId(String),
}

/// Archetype оружия
///
/// Инвариант: `rounds_per_minute > 0`, `magazine_capacity ≥ 1`, `pellet_count ≥ 1`
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDefinition {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Урон одного попадания (одной дробины для shotgun)
    pub damage_per_hit: u32,
    pub rounds_per_minute: f32,
    pub magazine_capacity: u32,
    pub reserve_capacity: u32,
    pub reload_duration_secs: f32,
    /// Максимальное угловое отклонение луча (рад)
    pub spread_radians: f32,
    pub max_range: f32,
    /// > 1 только для multi-projectile оружия
    pub pellet_count: u32,
    /// Auto = стреляет пока зажат trigger, semi = только на нажатие
    pub fully_automatic: bool,
    /// Cosmetic skins (без влияния на геймплей)
    pub skins: &'static [&'static str],
}

impl WeaponDefinition {
    /// Rate-of-fire gate: минимальный интервал между выстрелами (60000 / rpm ms)
    pub fn fire_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.rounds_per_minute as f64)
    }

    pub fn reload_duration(&self) -> Duration {
        Duration::from_secs_f32(self.reload_duration_secs.max(0.0))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason| CatalogError::InvalidDefinition {
            id: self.id.to_string(),
            reason,
        };

        if !self.rounds_per_minute.is_finite() || self.rounds_per_minute <= 0.0 {
            return Err(invalid("rounds per minute must be positive"));
        }
        if self.magazine_capacity == 0 {
            return Err(invalid("magazine capacity must be at least 1"));
        }
        if self.pellet_count == 0 {
            return Err(invalid("pellet count must be at least 1"));
        }
        if !self.reload_duration_secs.is_finite() || self.reload_duration_secs < 0.0 {
            return Err(invalid("reload duration must be non-negative"));
        }
        if self.max_range.is_nan() || self.max_range <= 0.0 {
            return Err(invalid("max range must be positive"));
        }
        Ok(())
    }

    pub fn sidearm() -> Self {
        Self {
            id: "pistol",
            display_name: "Sidearm",
            damage_per_hit: 34,
            rounds_per_minute: 300.0,
            magazine_capacity: 12,
            reserve_capacity: 48,
            reload_duration_secs: 1.2,
            spread_radians: 0.012,
            max_range: 1800.0,
            pellet_count: 1,
            fully_automatic: false,
            skins: &["Standard", "Carbon", "Gilded"],
        }
    }

    pub fn assault_rifle() -> Self {
        Self {
            id: "rifle",
            display_name: "Assault Rifle",
            damage_per_hit: 28,
            rounds_per_minute: 700.0,
            magazine_capacity: 30,
            reserve_capacity: 120,
            reload_duration_secs: 2.0,
            spread_radians: 0.02,
            max_range: 2500.0,
            pellet_count: 1,
            fully_automatic: true,
            skins: &["Standard", "Desert", "Arctic", "Neon"],
        }
    }

    pub fn scattergun() -> Self {
        Self {
            id: "shotgun",
            display_name: "Scattergun",
            damage_per_hit: 14,
            rounds_per_minute: 70.0,
            magazine_capacity: 6,
            reserve_capacity: 30,
            reload_duration_secs: 2.4,
            spread_radians: 0.09,
            max_range: 900.0,
            pellet_count: 8,
            fully_automatic: false,
            skins: &["Standard", "Rust"],
        }
    }

    pub fn marksman_rifle() -> Self {
        Self {
            id: "marksman",
            display_name: "Marksman Rifle",
            damage_per_hit: 75,
            rounds_per_minute: 120.0,
            magazine_capacity: 8,
            reserve_capacity: 32,
            reload_duration_secs: 2.6,
            spread_radians: 0.004,
            max_range: 4000.0,
            pellet_count: 1,
            fully_automatic: false,
            skins: &["Standard", "Woodland"],
        }
    }
}

/// Каталог (resource). Index в каталоге = слот в `Loadout`.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct WeaponCatalog {
    weapons: Vec<WeaponDefinition>,
}

impl Default for WeaponCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl WeaponCatalog {
    pub fn new(weapons: Vec<WeaponDefinition>) -> Result<Self, CatalogError> {
        if weapons.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (index, weapon) in weapons.iter().enumerate() {
            weapon.validate()?;
            if weapons[..index].iter().any(|other| other.id == weapon.id) {
                return Err(CatalogError::DuplicateId(weapon.id.to_string()));
            }
        }

        Ok(Self { weapons })
    }

    /// Sidearm, Assault Rifle, Scattergun, Marksman Rifle
    pub fn standard() -> Self {
        Self {
            weapons: vec![
                WeaponDefinition::sidearm(),
                WeaponDefinition::assault_rifle(),
                WeaponDefinition::scattergun(),
                WeaponDefinition::marksman_rifle(),
            ],
        }
    }

    pub fn get(&self, slot: usize) -> Option<&WeaponDefinition> {
        self.weapons.get(slot)
    }

    pub fn slot_of(&self, id: &str) -> Option<usize> {
        self.weapons.iter().position(|weapon| weapon.id == id)
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeaponDefinition> {
        self.weapons.iter()
    }
}
