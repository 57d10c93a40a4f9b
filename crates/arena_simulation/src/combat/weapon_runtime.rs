//! Weapon runtime - fire-rate gate + reload state machine
//!
//! Один `WeaponState` на запись каталога, все принадлежат игроку (`Loadout`).
//! Патроны меняются только выстрелом и завершением перезарядки.
//! Невалидные переходы (стрельба во время reload, reload полного магазина)
//! - молчаливый no-op, вызывающий получает outcome enum.

use bevy::prelude::*;
use std::time::Duration;

use crate::combat::{WeaponCatalog, WeaponDefinition};
use crate::input::WeaponSwitch;

/// Результат проверки rate-of-fire gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireGate {
    Ready,
    Reloading,
    /// Магазин пуст (вызывающий обязан попробовать reload)
    Empty,
    /// С прошлого выстрела прошло меньше 60000 / rpm ms
    Cooling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Перезарядка началась, `ReloadComplete` нужно поставить через `duration`
    Started { duration: Duration },
    AlreadyReloading,
    MagazineFull,
    NoReserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Один патрон списан, резолвим `pellet_count` лучей
    Fired,
    Reloading,
    Cooling,
    /// Пустой магазин → implicit reload attempt
    Empty(ReloadOutcome),
}

/// Mutable состояние одного оружия
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponState {
    pub current_ammo: u32,
    pub reserve_ammo: u32,
    pub last_fire: Option<Duration>,
    pub is_reloading: bool,
    /// Cosmetic only
    pub skin_index: usize,
}

impl WeaponState {
    /// Полный магазин + полный резерв
    pub fn new(def: &WeaponDefinition) -> Self {
        Self {
            current_ammo: def.magazine_capacity,
            reserve_ammo: def.reserve_capacity,
            last_fire: None,
            is_reloading: false,
            skin_index: 0,
        }
    }

    pub fn fire_gate(&self, def: &WeaponDefinition, now: Duration) -> FireGate {
        if self.is_reloading {
            return FireGate::Reloading;
        }
        if self.current_ammo == 0 {
            return FireGate::Empty;
        }
        match self.last_fire {
            Some(last) if now.saturating_sub(last) < def.fire_interval() => FireGate::Cooling,
            _ => FireGate::Ready,
        }
    }

    pub fn can_fire(&self, def: &WeaponDefinition, now: Duration) -> bool {
        self.fire_gate(def, now) == FireGate::Ready
    }

    /// Выстрел: ровно 1 патрон независимо от `pellet_count`
    pub fn try_fire(&mut self, def: &WeaponDefinition, now: Duration) -> FireOutcome {
        match self.fire_gate(def, now) {
            FireGate::Ready => {
                self.last_fire = Some(now);
                self.current_ammo -= 1;
                FireOutcome::Fired
            }
            FireGate::Reloading => FireOutcome::Reloading,
            FireGate::Cooling => FireOutcome::Cooling,
            FireGate::Empty => FireOutcome::Empty(self.begin_reload(def)),
        }
    }

    pub fn begin_reload(&mut self, def: &WeaponDefinition) -> ReloadOutcome {
        if self.is_reloading {
            return ReloadOutcome::AlreadyReloading;
        }
        if self.current_ammo >= def.magazine_capacity {
            return ReloadOutcome::MagazineFull;
        }
        if self.reserve_ammo == 0 {
            return ReloadOutcome::NoReserve;
        }

        self.is_reloading = true;
        ReloadOutcome::Started {
            duration: def.reload_duration(),
        }
    }

    /// Завершение reload: переносит min(capacity - current, reserve).
    /// Возвращает перенесённое количество (0 если reload не шёл).
    pub fn finish_reload(&mut self, def: &WeaponDefinition) -> u32 {
        if !self.is_reloading {
            return 0;
        }

        let missing = def.magazine_capacity.saturating_sub(self.current_ammo);
        let transferred = missing.min(self.reserve_ammo);
        self.current_ammo += transferred;
        self.reserve_ammo -= transferred;
        self.is_reloading = false;
        transferred
    }

    pub fn cycle_skin(&mut self, def: &WeaponDefinition) {
        if def.skins.is_empty() {
            return;
        }
        self.skin_index = (self.skin_index + 1) % def.skins.len();
    }
}

/// Оружие игрока: по `WeaponState` на каждый слот каталога + экипированный слот
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Loadout {
    pub slots: Vec<WeaponState>,
    pub equipped: usize,
    /// Trigger был зажат в прошлом тике (semi-auto edge detection)
    pub trigger_held: bool,
}

impl Loadout {
    pub fn from_catalog(catalog: &WeaponCatalog) -> Self {
        Self {
            slots: catalog.iter().map(WeaponState::new).collect(),
            equipped: 0,
            trigger_held: false,
        }
    }

    pub fn equipped_state(&self) -> &WeaponState {
        &self.slots[self.equipped]
    }

    pub fn equipped_state_mut(&mut self) -> &mut WeaponState {
        &mut self.slots[self.equipped]
    }

    /// Unconditional + instant. Идущий reload старого слота продолжается в фоне.
    /// Возвращает true если слот изменился.
    pub fn switch(&mut self, command: WeaponSwitch) -> bool {
        let count = self.slots.len();
        if count == 0 {
            return false;
        }

        let target = match command {
            WeaponSwitch::Absolute(index) if index < count => index,
            WeaponSwitch::Absolute(_) => return false,
            WeaponSwitch::Relative(step) => {
                (self.equipped as i64 + step as i64).rem_euclid(count as i64) as usize
            }
        };

        let changed = target != self.equipped;
        self.equipped = target;
        changed
    }
}
