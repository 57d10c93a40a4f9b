//! Hit-Query Service (hitscan ray intersection)
//!
//! Контракт внешнего collaborator'а: ближайшее пересечение луча с одним из
//! двух pool'ов - enemy hit-volumes или static world colliders.
//! Сервис stateless: геометрию получает через `HitScene` на каждый запрос.
//!
//! `GeometryHitQuery` - встроенная реализация (сферы + AABB + пол) для
//! headless режима и тестов. Движок может подставить свою.

use bevy::prelude::*;
use std::sync::Arc;

use crate::components::HitVolumeHandle;

/// Какой pool опрашиваем
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitPool {
    EnemyVolumes,
    WorldColliders,
}

/// Луч: origin + normalized direction, не дальше max_range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRay {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_range: f32,
}

impl HitRay {
    pub fn new(origin: Vec3, direction: Vec3, max_range: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_range,
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Результат попадания
///
/// `volume` заполнен только для `HitPool::EnemyVolumes`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Option<Vec3>,
    pub distance: f32,
    pub volume: Option<HitVolumeHandle>,
}

/// `None` = промах
pub type HitQueryResult = Option<RayHit>;

/// Живой hit-volume врага (снимок на момент запроса)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitVolume {
    pub handle: HitVolumeHandle,
    pub center: Vec3,
    pub radius: f32,
}

/// Статический axis-aligned collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl ColliderBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }
}

/// Static world geometry (resource)
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct WorldColliders {
    /// Высота пола (None = без пола)
    pub ground_height: Option<f32>,
    pub boxes: Vec<ColliderBox>,
}

impl Default for WorldColliders {
    fn default() -> Self {
        Self {
            ground_height: Some(0.0),
            boxes: Vec::new(),
        }
    }
}

impl WorldColliders {
    pub fn with_box(mut self, collider: ColliderBox) -> Self {
        self.boxes.push(collider);
        self
    }
}

/// Read-only view геометрии для одного запроса
#[derive(Debug, Clone, Copy)]
pub struct HitScene<'a> {
    pub enemy_volumes: &'a [HitVolume],
    pub world: &'a WorldColliders,
}

pub trait HitQueryService: Send + Sync {
    fn query(&self, scene: &HitScene<'_>, ray: &HitRay, pool: HitPool) -> HitQueryResult;
}

impl<T: HitQueryService + ?Sized> HitQueryService for Arc<T> {
    fn query(&self, scene: &HitScene<'_>, ray: &HitRay, pool: HitPool) -> HitQueryResult {
        (**self).query(scene, ray, pool)
    }
}

/// Resource-обёртка над сервисом
#[derive(Resource)]
pub struct HitQueries {
    pub service: Box<dyn HitQueryService>,
}

impl HitQueries {
    pub fn new(service: Box<dyn HitQueryService>) -> Self {
        Self { service }
    }
}

impl Default for HitQueries {
    fn default() -> Self {
        Self::new(Box::new(GeometryHitQuery))
    }
}

/// Встроенная геометрия: ray/sphere, ray/AABB (slab), ray/plane
#[derive(Debug, Default, Clone, Copy)]
pub struct GeometryHitQuery;

impl HitQueryService for GeometryHitQuery {
    fn query(&self, scene: &HitScene<'_>, ray: &HitRay, pool: HitPool) -> HitQueryResult {
        if ray.direction == Vec3::ZERO || ray.max_range <= 0.0 {
            return None;
        }

        let nearest = |best: Option<RayHit>, candidate: Option<RayHit>| match (best, candidate) {
            (Some(b), Some(c)) if c.distance < b.distance => Some(c),
            (None, c) => c,
            (b, _) => b,
        };

        match pool {
            HitPool::EnemyVolumes => scene
                .enemy_volumes
                .iter()
                .map(|volume| ray_sphere(ray, volume))
                .fold(None, nearest),
            HitPool::WorldColliders => {
                let ground = scene.world.ground_height.and_then(|height| ray_ground(ray, height));
                scene
                    .world
                    .boxes
                    .iter()
                    .map(|collider| ray_box(ray, collider))
                    .fold(ground, nearest)
            }
        }
    }
}

fn ray_sphere(ray: &HitRay, volume: &HitVolume) -> Option<RayHit> {
    let offset = ray.origin - volume.center;
    let b = offset.dot(ray.direction);
    let c = offset.length_squared() - volume.radius * volume.radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let mut distance = -b - root;
    if distance < 0.0 {
        // origin внутри сферы
        distance = -b + root;
    }
    if distance < 0.0 || distance > ray.max_range {
        return None;
    }

    let point = ray.at(distance);
    Some(RayHit {
        point,
        normal: (point - volume.center).try_normalize(),
        distance,
        volume: Some(volume.handle),
    })
}

fn ray_box(ray: &HitRay, collider: &ColliderBox) -> Option<RayHit> {
    let origin = ray.origin.to_array();
    let direction = ray.direction.to_array();
    let min = collider.min.to_array();
    let max = collider.max.to_array();

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0;

    for axis in 0..3 {
        if direction[axis].abs() < f32::EPSILON {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / direction[axis];
        let t1 = (min[axis] - origin[axis]) * inv;
        let t2 = (max[axis] - origin[axis]) * inv;
        let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

        if near > t_enter {
            t_enter = near;
            enter_axis = axis;
        }
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return None;
        }
    }

    // origin внутри box'а или box позади луча
    if t_enter < 0.0 || t_enter > ray.max_range {
        return None;
    }

    let mut normal = [0.0; 3];
    normal[enter_axis] = -direction[enter_axis].signum();

    Some(RayHit {
        point: ray.at(t_enter),
        normal: Some(Vec3::from_array(normal)),
        distance: t_enter,
        volume: None,
    })
}

fn ray_ground(ray: &HitRay, height: f32) -> Option<RayHit> {
    if ray.direction.y >= 0.0 || ray.origin.y < height {
        return None;
    }

    let distance = (height - ray.origin.y) / ray.direction.y;
    if distance > ray.max_range {
        return None;
    }

    Some(RayHit {
        point: ray.at(distance),
        normal: Some(Vec3::Y),
        distance,
        volume: None,
    })
}
