//! Combat integration test
//!
//! Полный тик через `Simulation`: scheduled tasks → weapon commands →
//! locomotion → player fire → AI → regen → presentation.
//!
//! Проверяем:
//! - Rate-of-fire gate и расход патронов (AR, shotgun)
//! - Атомарность kill (мёртвый враг не попадает под следующие дробины)
//! - Reload через очередь задач, switch не отменяет reload
//! - Смерть и respawn игрока
//! - FSM врагов от дистанции, движение, стрельба, bounds, facing

use bevy::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arena_simulation::combat::{GeometryHitQuery, HitQueryResult};
use arena_simulation::*;

const STEP: Duration = Duration::from_millis(50);

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Арена без врагов
fn empty_arena() -> Simulation {
    Simulation::builder()
        .enemy_positions(Vec::new())
        .build()
        .expect("default simulation must build")
}

/// Считает enemy-pool запросы, геометрию делегирует
#[derive(Default)]
struct CountingQuery {
    enemy_queries: AtomicUsize,
}

impl HitQueryService for CountingQuery {
    fn query(&self, scene: &HitScene<'_>, ray: &HitRay, pool: HitPool) -> HitQueryResult {
        if pool == HitPool::EnemyVolumes {
            self.enemy_queries.fetch_add(1, Ordering::SeqCst);
        }
        GeometryHitQuery.query(scene, ray, pool)
    }
}

fn fire() -> PlayerInput {
    PlayerInput {
        firing: true,
        ..default()
    }
}

fn count_status(events: &[PresentationEvent], text: &str) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, PresentationEvent::StatusMessage { text: t } if t.contains(text)))
        .count()
}

#[test]
fn test_assault_rifle_three_shots_50ms_apart_spend_two_rounds() {
    let mut sim = empty_arena();
    let mut events = Vec::new();

    let equip_and_fire = PlayerInput {
        switch: Some(WeaponSwitch::Absolute(1)),
        ..fire()
    };
    sim.tick(Duration::ZERO, equip_and_fire, &mut events);
    sim.tick(STEP, fire(), &mut events);
    sim.tick(STEP, fire(), &mut events);

    let rifle = sim.weapon_state(1).unwrap();
    assert_eq!(rifle.current_ammo, 28, "t=0 и t=100ms стреляют, t=50ms нет");

    let flashes = events
        .iter()
        .filter(|event| matches!(event, PresentationEvent::MuzzleFlash { slot: 1 }))
        .count();
    assert_eq!(flashes, 2);
}

#[test]
fn test_shotgun_one_round_and_pellet_count_queries() {
    let counter = Arc::new(CountingQuery::default());
    let mut sim = Simulation::builder()
        .enemy_positions(Vec::new())
        .hit_service(Arc::clone(&counter))
        .build()
        .unwrap();

    let input = PlayerInput {
        switch: Some(WeaponSwitch::Absolute(2)),
        ..fire()
    };
    sim.tick(Duration::ZERO, input, &mut DiscardSink);

    let shotgun = sim.weapon_state(2).unwrap();
    assert_eq!(shotgun.current_ammo, 5);
    assert_eq!(counter.enemy_queries.load(Ordering::SeqCst), 8);
}

#[test]
fn test_semi_auto_fires_only_on_press() {
    let mut sim = empty_arena();

    // Пистолет (slot 0): зажатый trigger стреляет один раз
    for _ in 0..10 {
        sim.tick(STEP, fire(), &mut DiscardSink);
    }
    assert_eq!(sim.weapon_state(0).unwrap().current_ammo, 11);

    // Отпустить → нажать снова
    sim.tick(STEP, PlayerInput::default(), &mut DiscardSink);
    sim.tick(STEP, fire(), &mut DiscardSink);
    assert_eq!(sim.weapon_state(0).unwrap().current_ammo, 10);
}

#[test]
fn test_dead_enemy_removed_atomically() {
    let piercing = WeaponDefinition {
        id: "test_burst",
        damage_per_hit: 60,
        pellet_count: 3,
        spread_radians: 0.0,
        ..WeaponDefinition::scattergun()
    };
    let mut sim = Simulation::builder()
        .catalog(vec![piercing])
        .enemy_positions(vec![Vec3::new(0.0, 60.0, -300.0), Vec3::new(0.0, 60.0, -600.0)])
        .build()
        .unwrap();
    let mut events = Vec::new();

    sim.tick(Duration::ZERO, fire(), &mut events);

    // Первый враг: 100 - 60 - 60 → мёртв, третья дробина ушла во второго
    let enemies = sim.enemies();
    assert_eq!(enemies.len(), 1);
    assert_eq!(enemies[0].id, EnemyId(2));
    assert_eq!(enemies[0].health, 40);

    let killed: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            PresentationEvent::EnemyHealthChanged { enemy, fraction } if *fraction == 0.0 => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(killed, vec![EnemyId(1)]);
    assert_eq!(count_status(&events, "eliminated"), 1);

    // Замена через 3s: новая identity, не reset старой
    for _ in 0..60 {
        sim.tick(STEP, PlayerInput::default(), &mut DiscardSink);
    }
    let ids: Vec<_> = sim.enemies().iter().map(|enemy| enemy.id).collect();
    assert_eq!(ids, vec![EnemyId(2), EnemyId(3)]);
}

#[test]
fn test_reload_completes_via_scheduled_task() {
    let mut sim = empty_arena();

    sim.tick(Duration::ZERO, fire(), &mut DiscardSink);
    sim.tick(
        STEP,
        PlayerInput {
            reload: true,
            ..default()
        },
        &mut DiscardSink,
    );
    assert!(sim.weapon_state(0).unwrap().is_reloading);

    // Switch посреди reload не отменяет его
    sim.tick(
        STEP,
        PlayerInput {
            switch: Some(WeaponSwitch::Relative(1)),
            ..default()
        },
        &mut DiscardSink,
    );
    assert_eq!(sim.player().equipped, 1);

    // reload начат в t=50ms, длится 1.2s
    while sim.now() < ms(1250) {
        sim.tick(STEP, PlayerInput::default(), &mut DiscardSink);
    }

    let pistol = sim.weapon_state(0).unwrap();
    assert!(!pistol.is_reloading);
    assert_eq!(pistol.current_ammo, 12);
    assert_eq!(pistol.reserve_ammo, 47);
}

#[test]
fn test_reload_with_full_magazine_is_noop() {
    let mut sim = empty_arena();
    let mut events = Vec::new();

    sim.tick(
        STEP,
        PlayerInput {
            reload: true,
            ..default()
        },
        &mut events,
    );

    assert!(!sim.weapon_state(0).unwrap().is_reloading);
    assert_eq!(sim.pending_tasks(), 0);
    assert_eq!(count_status(&events, "Reloading"), 0);
}

#[test]
fn test_player_death_and_respawn() {
    // Броски: hit roll 0.0 (попадание) → damage roll ≈1.0 (14 урона)
    let mut sim = Simulation::builder()
        .enemy_positions(vec![Vec3::new(0.0, 50.0, -300.0)])
        .random_source(ScriptedRandom::new(vec![0.0, 0.999_999]))
        .build()
        .unwrap();
    let player = sim.player_entity();
    sim.world_mut().get_mut::<Health>(player).unwrap().current = 10;

    let mut events = Vec::new();
    sim.tick(Duration::ZERO, PlayerInput::default(), &mut events);

    let dead = sim.player();
    assert_eq!(dead.health, 0);
    assert!(dead.awaiting_respawn);
    assert!(events.contains(&PresentationEvent::PlayerHealthChanged { fraction: 0.0 }));
    assert!(sim.is_scheduled(ScheduledTask::RespawnPlayer));

    // Мёртвый игрок не двигается и не стреляет
    let walk_and_fire = PlayerInput {
        forward: true,
        ..fire()
    };
    sim.tick(STEP, walk_and_fire, &mut DiscardSink);
    assert_eq!(sim.player().position, dead.position);
    assert_eq!(sim.weapon_state(0).unwrap().current_ammo, 12);

    // Respawn ровно через 3s (следующий выстрел врага только в 3.2s)
    while sim.now() < ms(3000) {
        sim.tick(STEP, PlayerInput::default(), &mut DiscardSink);
    }

    let alive = sim.player();
    assert_eq!(alive.health, 100);
    assert_eq!(alive.last_damage, None);
    assert!(!alive.awaiting_respawn);
    assert_eq!(alive.position, SimulationConfig::default().world.player_spawn());
}

#[test]
fn test_weapon_switch_applies_while_dead() {
    let mut sim = Simulation::builder()
        .enemy_positions(vec![Vec3::new(0.0, 50.0, -300.0)])
        .random_source(ScriptedRandom::new(vec![0.0, 0.999_999]))
        .build()
        .unwrap();
    let player = sim.player_entity();
    sim.world_mut().get_mut::<Health>(player).unwrap().current = 10;
    sim.tick(Duration::ZERO, PlayerInput::default(), &mut DiscardSink);
    assert!(sim.player().awaiting_respawn);

    let mut events = Vec::new();
    let input = PlayerInput {
        switch: Some(WeaponSwitch::Absolute(1)),
        cycle_skin: true,
        ..default()
    };
    sim.tick(STEP, input, &mut events);

    // Switch безусловный, skin / reload ждут respawn
    assert_eq!(sim.player().equipped, 1);
    assert_eq!(count_status(&events, "Equipped"), 1);
    assert_eq!(count_status(&events, "skin"), 0);
    assert_eq!(sim.weapon_state(1).unwrap().skin_index, 0);
}

/// Позиции + rotation всех врагов по id
fn enemy_transforms(sim: &mut Simulation) -> Vec<(EnemyId, Transform)> {
    let world = sim.world_mut();
    let mut query = world.query::<(&Enemy, &Transform)>();
    let mut result: Vec<_> = query.iter(world).map(|(enemy, transform)| (enemy.id, *transform)).collect();
    result.sort_by_key(|(id, _)| *id);
    result
}

fn near_misses(events: &[PresentationEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, PresentationEvent::Impact { normal: None, .. }))
        .count()
}

#[test]
fn test_chase_moves_toward_player_and_faces_it() {
    let mut sim = Simulation::builder()
        .enemy_positions(vec![Vec3::new(0.0, 50.0, -900.0)])
        .build()
        .unwrap();
    let mut events = Vec::new();

    for _ in 0..20 {
        sim.tick(STEP, PlayerInput::default(), &mut events);
    }

    // 80 u/s * 1s, дистанция всё ещё > attack range
    let enemy = &sim.enemies()[0];
    assert_eq!(enemy.state, AIState::Chase);
    assert!((enemy.position.z + 820.0).abs() < 1e-2, "position = {:?}", enemy.position);
    assert!(enemy.position.x.abs() < 1e-3);
    assert_eq!(near_misses(&events), 0, "Chase не стреляет");

    let (_, transform) = enemy_transforms(&mut sim)[0];
    assert!(transform.forward().dot(Vec3::Z) > 0.999);
}

#[test]
fn test_attack_closes_slowly_and_fires_every_800ms() {
    // 0.99 >= hit chance → всегда промах
    let mut sim = Simulation::builder()
        .enemy_positions(vec![Vec3::new(0.0, 50.0, 400.0)])
        .random_source(ScriptedRandom::constant(0.99))
        .build()
        .unwrap();

    let mut shot_times = Vec::new();
    let mut impacts = Vec::new();
    for _ in 0..20 {
        let mut events = Vec::new();
        sim.tick(STEP, PlayerInput::default(), &mut events);
        if near_misses(&events) > 0 {
            shot_times.push(sim.now());
        }
        impacts.extend(events);
    }

    let enemy = &sim.enemies()[0];
    assert_eq!(enemy.state, AIState::Attack);
    assert!((enemy.position.z - 380.0).abs() < 1e-2, "position = {:?}", enemy.position);
    assert_eq!(shot_times, vec![ms(50), ms(850)]);

    // Cosmetic near-miss рядом с игроком, урона нет
    let player = sim.player();
    assert_eq!(player.health, 100);
    for event in &impacts {
        if let PresentationEvent::Impact { point, normal: None } = event {
            assert!((point.x - player.position.x).abs() <= 40.0);
            assert!((point.y - player.position.y).abs() <= 20.0);
            assert!((point.z - player.position.z).abs() <= 40.0);
        }
    }

    let (_, transform) = enemy_transforms(&mut sim)[0];
    assert!(transform.forward().dot(Vec3::NEG_Z) > 0.999);
}

#[test]
fn test_patrol_wander_reheads_after_scheduled_interval() {
    // Броски: heading 0.25 (→ +Z), interval 0.5 (→ 2.5s), heading 0.5 (→ -X), interval 0.0 (→ 1.5s)
    let mut sim = Simulation::builder()
        .enemy_positions(vec![Vec3::new(0.0, 50.0, 1500.0)])
        .random_source(ScriptedRandom::new(vec![0.25, 0.5, 0.5, 0.0]))
        .build()
        .unwrap();

    sim.tick(STEP, PlayerInput::default(), &mut DiscardSink);
    let next_change = {
        let world = sim.world_mut();
        let mut query = world.query::<&Wander>();
        query.iter(world).map(|wander| wander.next_change).next().unwrap()
    };
    let interval = next_change - sim.now();
    assert_eq!(interval, ms(2500));
    assert!(interval >= ms(1500) && interval < ms(3500));

    // До next_change идём по +Z со скоростью patrol (60 u/s)
    while sim.now() < ms(2500) {
        sim.tick(STEP, PlayerInput::default(), &mut DiscardSink);
    }
    let before = sim.enemies()[0].position;
    assert_eq!(sim.enemies()[0].state, AIState::Patrol);
    assert!((before.z - 1650.0).abs() < 1e-2, "position = {:?}", before);
    assert!(before.x.abs() < 1e-2);

    // t = 2.55s: новый heading -X
    sim.tick(STEP, PlayerInput::default(), &mut DiscardSink);
    let after = sim.enemies()[0].position;
    assert!((after.x + 3.0).abs() < 1e-2, "position = {:?}", after);
    assert!((after.z - before.z).abs() < 1e-2);
}

#[test]
fn test_enemy_clamped_to_inset_bounds() {
    // heading 0.0 → +X, прямо в стену
    let mut sim = Simulation::builder()
        .enemy_positions(vec![Vec3::new(1940.0, 50.0, 0.0)])
        .random_source(ScriptedRandom::constant(0.0))
        .build()
        .unwrap();

    for _ in 0..20 {
        sim.tick(STEP, PlayerInput::default(), &mut DiscardSink);
    }

    // half_extent 2000 - margin 50
    let enemy = &sim.enemies()[0];
    assert_eq!(enemy.state, AIState::Patrol);
    assert!((enemy.position.x - 1950.0).abs() < 1e-3, "position = {:?}", enemy.position);
}

#[test]
fn test_enemy_state_follows_distance() {
    let mut sim = Simulation::builder()
        .enemy_positions(vec![
            Vec3::new(0.0, 50.0, -500.0),
            Vec3::new(900.0, 50.0, 0.0),
            Vec3::new(0.0, 50.0, 1500.0),
        ])
        .build()
        .unwrap();

    sim.tick(Duration::ZERO, PlayerInput::default(), &mut DiscardSink);

    let states: Vec<_> = sim.enemies().iter().map(|enemy| enemy.state).collect();
    assert_eq!(states, vec![AIState::Attack, AIState::Chase, AIState::Patrol]);
}

#[test]
fn test_long_frame_is_clamped() {
    let mut sim = empty_arena();
    let input = PlayerInput {
        forward: true,
        ..default()
    };

    sim.tick(Duration::from_secs(2), input, &mut DiscardSink);

    assert_eq!(sim.now(), ms(50));
    // 220 * clamp(10 * 0.05) = 110 u/s → 5.5 units за тик
    assert!((sim.player().position.z + 5.5).abs() < 1e-3, "position = {:?}", sim.player().position);
}

#[test]
fn test_health_invariants_over_long_run() {
    let mut sim = Simulation::new(SimulationConfig::default()).unwrap();

    for tick in 0..1200 {
        let input = PlayerInput {
            firing: tick % 2 == 0,
            left: tick % 400 < 200,
            right: tick % 400 >= 200,
            yaw: tick as f32 * 0.02,
            switch: (tick % 250 == 0).then_some(WeaponSwitch::Relative(1)),
            ..default()
        };
        sim.tick(STEP, input, &mut DiscardSink);

        let player = sim.player();
        assert!(player.health <= player.max_health);
        assert!(player.position.y >= 60.0 - 1e-3);

        for enemy in sim.enemies() {
            assert!(enemy.health > 0 && enemy.health <= 100, "tick {}: {:?}", tick, enemy);
            assert!(enemy.position.x.abs() <= 1950.0 && enemy.position.z.abs() <= 1950.0);
        }
        for slot in 0..sim.catalog().len() {
            let state = sim.weapon_state(slot).unwrap();
            let def = sim.catalog().get(slot).unwrap();
            assert!(state.current_ammo <= def.magazine_capacity);
            assert!(state.reserve_ammo <= def.reserve_capacity);
        }
    }
}
