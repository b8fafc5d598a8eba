//! Headless симуляция HIVE
//!
//! Отряд морпехов против роя drones и queen: perception, melee, grab-атака.
//! Presentation-слой здесь условный: retract-позы "доигрываются" мгновенно.
//!
//! Опционально: путь к JSON конфигу первым аргументом.

use bevy::prelude::*;
use hive_simulation::combat::{AttackProfile, AttackProfiles, AttackSlot, FacingRequirement, MeleeStrike, ProfileError};
use hive_simulation::components::{Actor, Classification, DamageResistance, Health};
use hive_simulation::grab::{GrabBoss, GrabCue, GrabPresentation, PresentationFinished};
use hive_simulation::perception::{Perception, SwarmSense};
use hive_simulation::relations::Relationship;
use hive_simulation::{
    create_headless_app, log_error, run_fixed_tick, CollisionWorld, Dead, GrabGroups, SimulationConfig,
    SimulationPlugin, SimulationSet,
};

const HIVE: u64 = 1;
const MARINES: u64 = 2;

/// Presentation stub: retract-поза сразу завершена
fn finish_retract_poses(
    mut cues: EventReader<GrabPresentation>,
    mut finished: EventWriter<PresentationFinished>,
) {
    for cue in cues.read() {
        if cue.cue == GrabCue::EnterRetractPose {
            finished.write(PresentationFinished { member: cue.member });
        }
    }
}

/// Невалидный профиль не роняет демо: логируем и оставляем агента без атак
fn profiles_or_empty(owner: &str, profiles: Result<AttackProfiles, ProfileError>) -> AttackProfiles {
    profiles.unwrap_or_else(|err| {
        log_error(&format!("⚠️ {} attack profiles rejected: {}", owner, err));
        AttackProfiles::new()
    })
}

fn drone_profiles() -> AttackProfiles {
    let claw = AttackProfile::melee(64.0, MeleeStrike::new(72.0, 12.0, 8.0))
        .with_facing(FacingRequirement::within_degrees(45.0))
        .with_cooldown(1.0);
    profiles_or_empty("Drone", AttackProfiles::new().with(AttackSlot::Melee1, claw))
}

fn queen_profiles() -> AttackProfiles {
    let sweep = AttackProfile::melee(140.0, MeleeStrike::new(160.0, 24.0, 40.0).with_force_scale(2.0))
        .with_facing(FacingRequirement::within_degrees(60.0))
        .with_facing_range_boost(0.5)
        .with_cooldown(3.0);
    profiles_or_empty("Queen", AttackProfiles::new().with(AttackSlot::Melee1, sweep))
}

fn load_config() -> SimulationConfig {
    let mut config = match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("Config {} rejected: {}", path, err));
                SimulationConfig::default()
            }
        },
        None => SimulationConfig::default(),
    };
    if config.factions.is_empty() {
        config.factions.push(hive_simulation::config::FactionRelationEntry {
            a: HIVE,
            b: MARINES,
            relationship: Relationship::Hostile,
        });
    }
    config
}

fn spawn_arena(world: &mut World, config: &SimulationConfig) {
    let mut collision = CollisionWorld::default();
    // Переборка между дальними drones и отрядом
    collision.add_obstacle(Vec3::new(-200.0, 0.0, 150.0), Vec3::new(200.0, 120.0, 170.0));
    world.insert_resource(collision);

    let squad = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(40.0, 0.0, 10.0),
        Vec3::new(-40.0, 0.0, 10.0),
        Vec3::new(0.0, 0.0, 50.0),
    ];
    for position in squad {
        world.spawn((
            Actor::new(MARINES, Classification::Marine),
            Health::new(100.0),
            Transform::from_translation(position),
        ));
    }

    // Drones вплотную к отряду
    for (i, position) in [Vec3::new(60.0, 0.0, -30.0), Vec3::new(-60.0, 0.0, -30.0)].into_iter().enumerate() {
        world.spawn((
            Actor::new(HIVE, Classification::Alien),
            Health::new(40.0 + i as f32 * 10.0),
            Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
            Perception::default(),
            SwarmSense::default(),
            drone_profiles(),
        ));
    }

    // Drones за переборкой: только swarm sense
    for x in [-100.0, 100.0] {
        world.spawn((
            Actor::new(HIVE, Classification::Alien),
            Health::new(40.0),
            Transform::from_xyz(x, 0.0, 300.0).looking_at(Vec3::ZERO, Vec3::Y),
            Perception::default(),
            SwarmSense::default(),
            drone_profiles(),
        ));
    }

    world.spawn((
        Actor::new(HIVE, Classification::Boss),
        Health::new(2000.0),
        DamageResistance { scale: 0.2 },
        Transform::from_xyz(0.0, 0.0, -400.0).looking_at(Vec3::ZERO, Vec3::Y),
        Perception::long_range(),
        SwarmSense::long_range(),
        GrabBoss::new(config.grab.clone()),
        queen_profiles(),
    ));
}

fn main() {
    let config = load_config();
    let seed = config.seed;
    println!("Starting HIVE headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(config.clone())
        .add_plugins(SimulationPlugin)
        .add_systems(FixedUpdate, finish_retract_poses.after(SimulationSet::Teardown));

    spawn_arena(app.world_mut(), &config);

    // 40 секунд: хватает на одну grab-атаку queen
    for tick in 0..2400 {
        run_fixed_tick(&mut app);

        if tick % 300 == 0 {
            let world = app.world_mut();
            let marines = world
                .query_filtered::<&Actor, Without<Dead>>()
                .iter(world)
                .filter(|actor| actor.classification == Classification::Marine)
                .count();
            let groups = world.resource::<GrabGroups>().len();
            let queen = world
                .query::<&GrabBoss>()
                .iter(world)
                .next()
                .map(|boss| format!("{:?}", boss.phase))
                .unwrap_or_else(|| "gone".to_string());
            println!(
                "Tick {}: {} marines alive, {} grab groups, queen {}",
                tick, marines, groups, queen
            );
        }
    }

    println!("Simulation complete!");
}
