//! Combat resolver: fire request → pellet rays → damage / impact
//!
//! Каждая дробина - независимый hitscan луч:
//! 1. Enemy pool первым (ближайший hit-volume)
//! 2. Промах по врагам → world colliders (impact с normal)
//! 3. Промах везде → ничего
//!
//! Убитый враг мгновенно исчезает из локального снимка volumes,
//! поэтому следующая дробина того же выстрела его уже не найдёт.

use bevy::prelude::*;

use crate::combat::hit_query::{HitPool, HitQueryService, HitRay, HitScene, HitVolume, WorldColliders};
use crate::combat::WeaponDefinition;
use crate::components::HitVolumeHandle;
use crate::random::RandomSource;

/// Вертикальный разброс меньше горизонтального (отдача уводит в стороны)
const VERTICAL_SPREAD_FACTOR: f32 = 0.2;

/// Один выстрел (уже прошедший rate-of-fire gate)
#[derive(Debug, Clone, Copy)]
pub struct FireRequest<'a> {
    pub weapon: &'a WeaponDefinition,
    /// Урон одной дробины
    pub damage: u32,
    pub origin: Vec3,
    pub direction: Vec3,
}

impl<'a> FireRequest<'a> {
    pub fn new(weapon: &'a WeaponDefinition, origin: Vec3, direction: Vec3) -> Self {
        Self {
            weapon,
            damage: weapon.damage_per_hit,
            origin,
            direction,
        }
    }
}

/// Что случилось с одной дробиной
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PelletOutcome {
    EnemyHit {
        volume: HitVolumeHandle,
        point: Vec3,
        killed: bool,
    },
    WorldImpact {
        point: Vec3,
        normal: Option<Vec3>,
    },
    Miss,
}

/// Ответ damage model на попадание по hit-volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyHitResolution {
    Applied { killed: bool },
    /// Handle больше не зарегистрирован → считается промахом по enemy pool
    Stale,
}

/// Отклонение базового направления на uniform offset в пределах `spread`
pub fn spread_direction(base: Vec3, spread: f32, rng: &mut dyn RandomSource) -> Vec3 {
    let forward = base.normalize_or_zero();
    if forward == Vec3::ZERO || spread <= 0.0 {
        return forward;
    }

    let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
    let up = right.cross(forward);

    let horizontal = rng.signed_unit() * spread;
    let vertical = rng.signed_unit() * spread * VERTICAL_SPREAD_FACTOR;

    (forward + right * horizontal + up * vertical).normalize_or_zero()
}

/// Резолв выстрела: ровно `pellet_count` enemy-pool запросов
///
/// `volumes` - live снимок врагов; убитые удаляются из него сразу.
/// `apply_hit` применяет урон и сообщает, умер ли враг.
pub fn resolve_fire(
    request: &FireRequest<'_>,
    service: &dyn HitQueryService,
    volumes: &mut Vec<HitVolume>,
    world: &WorldColliders,
    rng: &mut dyn RandomSource,
    mut apply_hit: impl FnMut(HitVolumeHandle, u32) -> EnemyHitResolution,
) -> Vec<PelletOutcome> {
    let pellets = request.weapon.pellet_count.max(1);
    let mut outcomes = Vec::with_capacity(pellets as usize);

    for _ in 0..pellets {
        let direction = spread_direction(request.direction, request.weapon.spread_radians, rng);
        let ray = HitRay::new(request.origin, direction, request.weapon.max_range);

        let enemy_hit = service.query(
            &HitScene { enemy_volumes: volumes.as_slice(), world },
            &ray,
            HitPool::EnemyVolumes,
        );

        if let Some((handle, point)) = enemy_hit.and_then(|hit| hit.volume.map(|handle| (handle, hit.point))) {
            match apply_hit(handle, request.damage) {
                EnemyHitResolution::Applied { killed } => {
                    if killed {
                        volumes.retain(|volume| volume.handle != handle);
                    }
                    outcomes.push(PelletOutcome::EnemyHit { volume: handle, point, killed });
                    continue;
                }
                EnemyHitResolution::Stale => {
                    volumes.retain(|volume| volume.handle != handle);
                }
            }
        }

        let world_hit = service.query(
            &HitScene { enemy_volumes: volumes.as_slice(), world },
            &ray,
            HitPool::WorldColliders,
        );

        outcomes.push(match world_hit {
            Some(hit) => PelletOutcome::WorldImpact {
                point: hit.point,
                normal: hit.normal,
            },
            None => PelletOutcome::Miss,
        });
    }

    outcomes
}
