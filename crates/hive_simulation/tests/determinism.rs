//! Тесты детерминизма
//!
//! Проверяем что симуляция с одинаковым seed даёт идентичные результаты:
//! swarm sense stagger (RNG), melee, grab-атака queen.

use bevy::prelude::*;
use hive_simulation::*;

const HIVE: u64 = 1;
const MARINES: u64 = 2;

/// Сцена: отряд, рой вокруг и queen с частой grab-атакой
fn spawn_scene(world: &mut World) {
    for i in 0..6 {
        let angle = i as f32 * std::f32::consts::TAU / 6.0;
        world.spawn((
            Actor::new(MARINES, Classification::Marine),
            Health::new(150.0),
            Transform::from_xyz(angle.cos() * 30.0, 0.0, angle.sin() * 30.0),
        ));
    }

    let claw = AttackProfile::melee(64.0, MeleeStrike::new(72.0, 12.0, 6.0))
        .with_facing(FacingRequirement::within_degrees(60.0))
        .with_cooldown(0.8);
    for i in 0..12 {
        let angle = i as f32 * std::f32::consts::TAU / 12.0;
        let position = Vec3::new(angle.cos() * 80.0, 0.0, angle.sin() * 80.0);
        world.spawn((
            Actor::new(HIVE, Classification::Alien),
            Health::new(40.0),
            Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
            Perception::default(),
            SwarmSense::default(),
            AttackProfiles::new().with(AttackSlot::Melee1, claw).unwrap_or_default(),
        ));
    }

    world.spawn((
        Actor::new(HIVE, Classification::Boss),
        Health::new(2000.0),
        DamageResistance { scale: 0.2 },
        Transform::from_xyz(0.0, 0.0, -300.0).looking_at(Vec3::ZERO, Vec3::Y),
        Perception::long_range(),
        SwarmSense::long_range(),
        GrabBoss::new(GrabAttackConfig {
            attack_interval: 2.0,
            attack_chance: 0.5,
            ..GrabAttackConfig::boss_default()
        }),
    ));
}

/// Запускает симуляцию и возвращает snapshot здоровья
fn run_simulation(seed: u64, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app(seed);
    app.insert_resource(FactionRelations::default().with(HIVE, MARINES, Relationship::Hostile))
        .add_plugins(SimulationPlugin);

    spawn_scene(app.world_mut());
    run_fixed_ticks(&mut app, tick_count);

    world_snapshot::<Health>(app.world_mut())
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 900;

    let snapshot1 = run_simulation(SEED, TICK_COUNT);
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 600;

    // Запускаем 3 раза — все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}
