//! Enemy компоненты: identity, hit-volume, wander, fire timer

use bevy::prelude::*;
use std::fmt;
use std::time::Duration;

/// Стабильная identity врага (никогда не переиспользуется)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnemyId(pub u64);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

/// Opaque handle hit-volume (то, что возвращает HitQueryService)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HitVolumeHandle(pub u64);

/// Враг
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy {
    pub id: EnemyId,
}

/// Геометрический proxy для hit-queries (сфера вокруг Transform.translation)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HitVolumeShape {
    pub handle: HitVolumeHandle,
    pub radius: f32,
}

/// Patrol wander: текущее направление + время следующей смены
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Wander {
    pub heading: Vec3,
    pub next_change: Duration,
}

impl Wander {
    /// Heading выбирается при первом же Patrol тике
    pub fn pending(now: Duration) -> Self {
        Self {
            heading: Vec3::ZERO,
            next_change: now,
        }
    }
}

/// Таймер выстрелов врага
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyFire {
    pub last_fire: Option<Duration>,
}

impl EnemyFire {
    pub fn ready(&self, now: Duration, interval: Duration) -> bool {
        match self.last_fire {
            Some(last) => now.saturating_sub(last) >= interval,
            None => true,
        }
    }
}
