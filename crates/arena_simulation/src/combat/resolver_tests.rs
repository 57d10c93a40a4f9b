//! Tests for combat resolver (pellets, spread, kill atomicity).

#[cfg(test)]
mod tests {
    use crate::combat::hit_query::*;
    use crate::combat::resolver::*;
    use crate::combat::WeaponDefinition;
    use crate::components::HitVolumeHandle;
    use crate::random::{DeterministicRng, ScriptedRandom};
    use bevy::prelude::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Считает запросы по pool'ам и делегирует в GeometryHitQuery
    #[derive(Default)]
    struct CountingQuery {
        enemy_queries: AtomicUsize,
        world_queries: AtomicUsize,
    }

    impl HitQueryService for CountingQuery {
        fn query(&self, scene: &HitScene<'_>, ray: &HitRay, pool: HitPool) -> HitQueryResult {
            match pool {
                HitPool::EnemyVolumes => self.enemy_queries.fetch_add(1, Ordering::SeqCst),
                HitPool::WorldColliders => self.world_queries.fetch_add(1, Ordering::SeqCst),
            };
            GeometryHitQuery.query(scene, ray, pool)
        }
    }

    fn enemy_at(handle: u64, z: f32) -> HitVolume {
        HitVolume {
            handle: HitVolumeHandle(handle),
            center: Vec3::new(0.0, 60.0, z),
            radius: 35.0,
        }
    }

    #[test]
    fn test_zero_spread_keeps_direction() {
        let mut rng = DeterministicRng::new(1);
        let direction = spread_direction(Vec3::NEG_Z, 0.0, &mut rng);
        assert_eq!(direction, Vec3::NEG_Z);
    }

    #[test]
    fn test_spread_stays_inside_cone() {
        let mut rng = DeterministicRng::new(3);
        let spread = 0.09;

        for _ in 0..200 {
            let direction = spread_direction(Vec3::NEG_Z, spread, &mut rng);
            assert!((direction.length() - 1.0).abs() < 1e-4);
            // tan(angle) ≤ sqrt(1 + 0.2²) * spread
            let angle = direction.angle_between(Vec3::NEG_Z);
            assert!(angle <= spread * 1.03, "angle = {}", angle);
        }
    }

    #[test]
    fn test_spread_extremes_follow_random_source() {
        // signed_unit = 2 * 0.999999 - 1 ≈ +1 → вправо (forward × Y = +X для -Z)
        let mut rng = ScriptedRandom::constant(0.999_999);
        let direction = spread_direction(Vec3::NEG_Z, 0.1, &mut rng);
        assert!(direction.x > 0.09);

        let mut rng = ScriptedRandom::constant(0.0);
        let direction = spread_direction(Vec3::NEG_Z, 0.1, &mut rng);
        assert!(direction.x < -0.09);
    }

    #[test]
    fn test_shotgun_queries_enemy_pool_once_per_pellet() {
        let shotgun = WeaponDefinition::scattergun();
        let service = CountingQuery::default();
        let world = WorldColliders::default();
        let mut volumes = Vec::new();
        let mut rng = DeterministicRng::new(9);

        let request = FireRequest::new(&shotgun, Vec3::new(0.0, 60.0, 0.0), Vec3::NEG_Z);
        let outcomes = resolve_fire(&request, &service, &mut volumes, &world, &mut rng, |_, _| {
            EnemyHitResolution::Stale
        });

        assert_eq!(outcomes.len(), 8);
        assert_eq!(service.enemy_queries.load(Ordering::SeqCst), 8);
        // Горизонтальный луч на пустой арене: мимо всего
        assert!(outcomes.iter().all(|outcome| *outcome == PelletOutcome::Miss));
    }

    #[test]
    fn test_killed_enemy_is_not_hit_by_later_pellets() {
        let weapon = WeaponDefinition {
            damage_per_hit: 60,
            pellet_count: 3,
            spread_radians: 0.0,
            ..WeaponDefinition::scattergun()
        };
        let service = GeometryHitQuery;
        let world = WorldColliders::default();
        let mut volumes = vec![enemy_at(1, -300.0), enemy_at(2, -600.0)];
        let mut rng = DeterministicRng::new(5);
        let mut health: HashMap<HitVolumeHandle, i64> = HashMap::from([(HitVolumeHandle(1), 100), (HitVolumeHandle(2), 100)]);

        let request = FireRequest::new(&weapon, Vec3::new(0.0, 60.0, 0.0), Vec3::NEG_Z);
        let outcomes = resolve_fire(&request, &service, &mut volumes, &world, &mut rng, |handle, damage| {
            let Some(hp) = health.get_mut(&handle) else {
                return EnemyHitResolution::Stale;
            };
            *hp -= damage as i64;
            EnemyHitResolution::Applied { killed: *hp <= 0 }
        });

        let hits: Vec<_> = outcomes
            .iter()
            .map(|outcome| match outcome {
                PelletOutcome::EnemyHit { volume, killed, .. } => (volume.0, *killed),
                other => panic!("unexpected outcome {:?}", other),
            })
            .collect();

        // 2-я дробина убивает первого врага, 3-я уходит во второго
        assert_eq!(hits, vec![(1, false), (1, true), (2, false)]);
        assert_eq!(volumes, vec![enemy_at(2, -600.0)]);
    }

    #[test]
    fn test_stale_handle_falls_through_to_world() {
        let pistol = WeaponDefinition {
            spread_radians: 0.0,
            ..WeaponDefinition::sidearm()
        };
        let service = CountingQuery::default();
        let world = WorldColliders::default().with_box(ColliderBox::from_center_size(
            Vec3::new(0.0, 60.0, -800.0),
            Vec3::new(200.0, 200.0, 20.0),
        ));
        let mut volumes = vec![enemy_at(4, -300.0)];
        let mut rng = DeterministicRng::new(5);

        let request = FireRequest::new(&pistol, Vec3::new(0.0, 60.0, 0.0), Vec3::NEG_Z);
        let outcomes = resolve_fire(&request, &service, &mut volumes, &world, &mut rng, |_, _| {
            EnemyHitResolution::Stale
        });

        assert!(volumes.is_empty());
        assert_eq!(service.world_queries.load(Ordering::SeqCst), 1);
        match outcomes.as_slice() {
            [PelletOutcome::WorldImpact { point, normal }] => {
                assert!((point.z + 790.0).abs() < 1e-2, "point = {:?}", point);
                assert_eq!(*normal, Some(Vec3::Z));
            }
            other => panic!("unexpected outcomes {:?}", other),
        }
    }
}
